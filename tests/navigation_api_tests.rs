mod common;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use common::{ACCOUNTANT, BRANCH_MANAGER, MockUserRepo, SALES_STAFF, STOREKEEPER, app_state, staff};
use pos_access_gate::{
    AppConfig, MockIdentityProvider, create_router,
    models::{
        CurrentUser, LandingRoute, LoginResponse, LogoutResponse, NavigationDecision, RouteView,
        UserProfile,
    },
    roles::{Role, RoleKind},
};
use serde::de::DeserializeOwned;
use tower::util::ServiceExt;
use uuid::Uuid;

fn app(users: Vec<CurrentUser>) -> Router {
    let state = app_state(
        MockUserRepo::with(users),
        MockIdentityProvider::new(Uuid::nil()),
        AppConfig::default(),
    );
    create_router(state)
}

async fn get(app: Router, uri: &str, user: Option<&CurrentUser>) -> axum::response::Response {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(user) = user {
        builder = builder.header("x-user-id", user.id.to_string());
    }
    app.oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn json_body<T: DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn decision_for(user: Option<&CurrentUser>, path: &str) -> NavigationDecision {
    let users = user.cloned().into_iter().collect();
    let response = get(app(users), &format!("/navigation/decide?path={}", path), user).await;
    assert_eq!(response.status(), StatusCode::OK);
    json_body(response).await
}

// --- Navigation Decisions ---

#[tokio::test]
async fn test_anonymous_user_is_sent_to_login() {
    let decision = decision_for(None, "/dashboard").await;
    assert!(!decision.allowed);
    assert_eq!(decision.redirect_to.as_deref(), Some("/login"));
    assert!(decision.replace);
}

#[tokio::test]
async fn test_accountant_denied_dashboard() {
    let accountant = staff(Some(ACCOUNTANT));
    let decision = decision_for(Some(&accountant), "/dashboard").await;
    assert_eq!(decision.redirect_to.as_deref(), Some("/pos"));
}

#[tokio::test]
async fn test_storekeeper_denied_customers() {
    let storekeeper = staff(Some(STOREKEEPER));
    let decision = decision_for(Some(&storekeeper), "/customers").await;
    assert!(!decision.allowed);
    assert_eq!(decision.redirect_to.as_deref(), Some("/pos"));
}

#[tokio::test]
async fn test_sales_staff_allowed_customers() {
    let sales = staff(Some(SALES_STAFF));
    let decision = decision_for(Some(&sales), "/customers").await;
    assert!(decision.allowed);
    assert_eq!(decision.redirect_to, None);
    assert!(!decision.replace);
}

#[tokio::test]
async fn test_everyone_allowed_on_fallback() {
    for role in [Some(STOREKEEPER), Some(SALES_STAFF), Some(ACCOUNTANT), Some("مالك"), None] {
        let user = staff(role);
        let decision = decision_for(Some(&user), "/pos").await;
        assert!(decision.allowed, "role {:?} must reach /pos", role);
    }
}

#[tokio::test]
async fn test_unknown_user_id_is_treated_as_anonymous() {
    let ghost = staff(Some(ACCOUNTANT));
    // Not registered in the repository.
    let response = get(app(vec![]), "/navigation/decide?path=/products", Some(&ghost)).await;
    let decision: NavigationDecision = json_body(response).await;
    assert_eq!(decision.redirect_to.as_deref(), Some("/login"));
}

#[tokio::test]
async fn test_unknown_path_is_not_found() {
    let response = get(app(vec![]), "/navigation/decide?path=/nowhere", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_route_listing_covers_all_screens() {
    let response = get(app(vec![]), "/routes", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let routes: Vec<RouteView> = json_body(response).await;
    assert_eq!(routes.len(), 19);

    let dashboard = routes.iter().find(|r| r.path == "/dashboard").unwrap();
    assert_eq!(dashboard.policy, "restricted_to");
    assert_eq!(
        dashboard.roles,
        vec![RoleKind::Accountant, RoleKind::BranchManager]
    );
}

// --- Session Endpoints ---

#[tokio::test]
async fn test_me_requires_session() {
    let response = get(app(vec![]), "/me", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_returns_profile_with_landing_route() {
    let manager = staff(Some(BRANCH_MANAGER));
    let response = get(app(vec![manager.clone()]), "/me", Some(&manager)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let profile: UserProfile = json_body(response).await;
    assert_eq!(profile.id, manager.id);
    assert_eq!(profile.role_kind, Some(RoleKind::BranchManager));
    assert_eq!(profile.role_name.as_deref(), Some(BRANCH_MANAGER));
    assert_eq!(profile.landing_route, "/pos");
}

#[tokio::test]
async fn test_me_shows_label_for_role_stored_by_slug() {
    let mut accountant = staff(None);
    accountant.role = Some(Role {
        id: Uuid::new_v4(),
        name: Some("accountant".to_string()),
        name_ar: None,
    });
    let owner = staff(Some("مالك"));

    let response = get(app(vec![accountant.clone()]), "/me", Some(&accountant)).await;
    let profile: UserProfile = json_body(response).await;
    assert_eq!(profile.role_kind, Some(RoleKind::Accountant));
    assert_eq!(profile.role_name.as_deref(), Some(ACCOUNTANT));

    let response = get(app(vec![owner.clone()]), "/me", Some(&owner)).await;
    let profile: UserProfile = json_body(response).await;
    assert_eq!(profile.role_kind, Some(RoleKind::Other));
    assert_eq!(profile.role_name.as_deref(), Some("مالك"));
}

#[tokio::test]
async fn test_landing_route_per_role() {
    let cases = [
        (Some(STOREKEEPER), "/inventory"),
        (Some(SALES_STAFF), "/products"),
        (Some(ACCOUNTANT), "/pos"),
        (Some(BRANCH_MANAGER), "/pos"),
        (Some("مالك"), "/dashboard"),
        (None, "/dashboard"),
    ];

    for (role, expected) in cases {
        let user = staff(role);
        let response = get(app(vec![user.clone()]), "/navigation/landing", Some(&user)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let landing: LandingRoute = json_body(response).await;
        assert_eq!(landing.path, expected, "role {:?}", role);
    }
}

// --- Login / Logout ---

fn login_app(identity: MockIdentityProvider, users: Vec<CurrentUser>) -> Router {
    create_router(app_state(
        MockUserRepo::with(users),
        identity,
        AppConfig::default(),
    ))
}

async fn post_login(app: Router, email: &str, password: &str) -> axum::response::Response {
    let body = serde_json::json!({ "email": email, "password": password });
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri("/login")
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

#[tokio::test]
async fn test_login_returns_token_and_landing_route() {
    let storekeeper = staff(Some(STOREKEEPER));
    let identity = MockIdentityProvider::new(storekeeper.id);
    let (email, password) = (identity.email.clone(), identity.password.clone());

    let response = post_login(login_app(identity, vec![storekeeper.clone()]), &email, &password).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: LoginResponse = json_body(response).await;
    assert_eq!(body.access_token, "mock-access-token");
    assert_eq!(body.user.id, storekeeper.id);
    assert_eq!(body.user.landing_route, "/inventory");
}

#[tokio::test]
async fn test_login_with_bad_password_is_unauthorized() {
    let identity = MockIdentityProvider::new(Uuid::new_v4());
    let email = identity.email.clone();

    let response = post_login(login_app(identity, vec![]), &email, "wrong").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_without_profile_is_forbidden() {
    let identity = MockIdentityProvider::new(Uuid::new_v4());
    let (email, password) = (identity.email.clone(), identity.password.clone());

    let response = post_login(login_app(identity, vec![]), &email, &password).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_login_provider_outage_is_bad_gateway() {
    let response = post_login(
        login_app(MockIdentityProvider::new_failing(), vec![]),
        "staff@store.test",
        "correct-horse",
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_logout_points_to_login() {
    let sales = staff(Some(SALES_STAFF));
    let response = login_app(MockIdentityProvider::new(sales.id), vec![sales.clone()])
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/logout")
                .header("x-user-id", sales.id.to_string())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: LogoutResponse = json_body(response).await;
    assert_eq!(body.redirect_to, "/login");
}

#[tokio::test]
async fn test_logout_requires_session() {
    let response = login_app(MockIdentityProvider::new(Uuid::nil()), vec![])
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/logout")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_responses_carry_request_id() {
    let response = get(app(vec![]), "/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
}
