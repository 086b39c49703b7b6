//! Router Integration Tests
//!
//! Drives the assembled router end to end: navigation, in-place data
//! updates, error broadcasts, redirects, API URL navigation and the
//! stale-load discard under overlapping reloads.


use std::sync::Arc;

use fixtures::{CannedResponse, EventProbe, FakeHttpClient, GatedClient};
use mediaroute_core::config::ViewSpec;
use mediaroute_core::events::{
	ROUTE_CHANGE_ERROR, ROUTE_CHANGE_START, ROUTE_CHANGE_SUCCESS, ROUTE_UPDATE,
};
use mediaroute_router::{MemoryLocation, Router};
use serde_json::json;

/// Router over `client` with the cart view registered and the location
/// parked at `path`.
fn cart_router(client: &FakeHttpClient, path: &str) -> Router {
	Router::builder()
		.http_client(client.clone())
		.api_prefix("api/")
		.location(MemoryLocation::new(path))
		.when(
			"application/x.cart",
			ViewSpec::new().template("<cart-view>").controller("CartCtrl"),
		)
		.build()
}

// ============================================================================
// Navigation
// ============================================================================

/// Test: navigating loads the route and publishes it as current
#[tokio::test]
async fn test_navigate_loads_and_publishes_current() {
	let client = FakeHttpClient::new();
	client.route("api/cart/1", CannedResponse::ok("application/x.cart", json!({ "items": 3 })));
	let router = cart_router(&client, "/");
	let success = EventProbe::on(router.events(), ROUTE_CHANGE_SUCCESS);

	router.navigate("/cart/1").await;

	let current = router.current().unwrap();
	assert_eq!(current.url, "api/cart/1");
	assert_eq!(current.media_type.as_deref(), Some("application/x.cart"));
	assert_eq!(current.template.as_deref(), Some("<cart-view>"));
	assert_eq!(success.count(), 1);
	assert_eq!(success.last_url(), Some("api/cart/1".to_string()));
	assert_eq!(router.url(), "api/cart/1");
}

/// Test: reloading the same resource merges data and fires routeUpdate
#[tokio::test]
async fn test_reload_same_resource_updates_data_in_place() {
	let client = FakeHttpClient::new();
	client.route("api/cart/1", CannedResponse::ok("application/x.cart", json!({ "items": 3 })));
	let router = cart_router(&client, "/cart/1");
	let success = EventProbe::on(router.events(), ROUTE_CHANGE_SUCCESS);

	router.reload(false).await;
	let mounted = router.current().unwrap();
	let update = EventProbe::on(mounted.events(), ROUTE_UPDATE);

	client.route("api/cart/1", CannedResponse::ok("application/x.cart", json!({ "items": 4 })));
	router.reload(false).await;

	// The mounted view stayed; only the data moved.
	let current = router.current().unwrap();
	assert_eq!(current.data, json!({ "items": 4 }));
	assert_eq!(current.template.as_deref(), Some("<cart-view>"));
	assert!(current.route_data_update);
	assert_eq!(update.count(), 1);
	assert_eq!(success.count(), 1);
}

/// Test: force reload replaces the current route instead of updating it
#[tokio::test]
async fn test_force_reload_replaces_current() {
	let client = FakeHttpClient::new();
	client.route("api/cart/1", CannedResponse::ok("application/x.cart", json!({ "items": 3 })));
	let router = cart_router(&client, "/cart/1");
	let success = EventProbe::on(router.events(), ROUTE_CHANGE_SUCCESS);

	router.reload(false).await;
	let mounted = router.current().unwrap();
	let update = EventProbe::on(mounted.events(), ROUTE_UPDATE);

	router.reload(true).await;

	assert_eq!(success.count(), 2);
	assert_eq!(update.count(), 0);
	assert!(!router.current().unwrap().route_data_update);
}

/// Test: the current response can reload itself through its router handle
#[tokio::test]
async fn test_current_response_reloads_through_router_handle() {
	let client = FakeHttpClient::new();
	client.route("api/cart/1", CannedResponse::ok("application/x.cart", json!({ "items": 3 })));
	let router = cart_router(&client, "/cart/1");

	router.reload(false).await;
	let mounted = router.current().unwrap();
	let update = EventProbe::on(mounted.events(), ROUTE_UPDATE);

	client.route("api/cart/1", CannedResponse::ok("application/x.cart", json!({ "items": 5 })));
	mounted.reload(false).await;

	assert_eq!(update.count(), 1);
	assert_eq!(router.current().unwrap().data, json!({ "items": 5 }));
}

// ============================================================================
// Failures
// ============================================================================

/// Test: a failing load broadcasts routeChangeError and keeps the current route
#[tokio::test]
async fn test_failed_load_keeps_current_and_broadcasts_error() {
	let client = FakeHttpClient::new();
	client.route("api/cart/1", CannedResponse::ok("application/x.cart", json!({ "items": 3 })));
	let router = cart_router(&client, "/cart/1");
	let success = EventProbe::on(router.events(), ROUTE_CHANGE_SUCCESS);
	let errors = EventProbe::on(router.events(), ROUTE_CHANGE_ERROR);

	router.reload(false).await;
	router.navigate("/missing").await;

	let current = router.current().unwrap();
	assert_eq!(current.url, "api/cart/1");
	assert_eq!(errors.count(), 1);
	assert_eq!(errors.last_url(), Some("api/missing".to_string()));
	assert_eq!(success.count(), 1);
}

/// Test: a matched error view arrives as a successful route change
#[tokio::test]
async fn test_error_view_load_is_a_route_change_success() {
	let client = FakeHttpClient::new();
	let router = Router::builder()
		.http_client(client.clone())
		.api_prefix("api/")
		.location(MemoryLocation::new("/missing"))
		.error_status(404, ViewSpec::new().template("<not-found>"))
		.build();
	let success = EventProbe::on(router.events(), ROUTE_CHANGE_SUCCESS);
	let errors = EventProbe::on(router.events(), ROUTE_CHANGE_ERROR);

	router.reload(false).await;

	let current = router.current().unwrap();
	assert!(current.route_error);
	assert_eq!(current.status, 404);
	assert_eq!(current.template.as_deref(), Some("<not-found>"));
	assert_eq!(success.count(), 1);
	assert_eq!(errors.count(), 0);
}

// ============================================================================
// Overlapping Loads
// ============================================================================

/// Test: an older in-flight load never clobbers a newer result
#[tokio::test]
async fn test_stale_load_is_discarded() {
	let client = GatedClient::new();
	client
		.responses
		.route("api/slow", CannedResponse::ok("application/x.cart", json!({ "which": "slow" })));
	client
		.responses
		.route("api/fast", CannedResponse::ok("application/x.cart", json!({ "which": "fast" })));
	let gate = client.gate("api/slow");

	let router = Arc::new(
		Router::builder()
			.http_client(client.clone())
			.api_prefix("api/")
			.location(MemoryLocation::new("/slow"))
			.when("application/x.cart", ViewSpec::new())
			.build(),
	);
	let success = EventProbe::on(router.events(), ROUTE_CHANGE_SUCCESS);

	let slow = tokio::spawn({
		let router = Arc::clone(&router);
		async move { router.reload(false).await }
	});

	// The slow load is parked inside the client; navigate past it.
	gate.arrived.notified().await;
	router.navigate("/fast").await;
	assert_eq!(success.count(), 1);

	gate.release.notify_one();
	slow.await.unwrap();

	let current = router.current().unwrap();
	assert_eq!(current.data, json!({ "which": "fast" }));
	assert_eq!(success.count(), 1);
}

// ============================================================================
// Redirects
// ============================================================================

/// Test: redirects rewrite the location and load nothing themselves
#[tokio::test]
async fn test_redirect_rewrites_location_then_next_reload_loads_target() {
	let client = FakeHttpClient::new();
	client.route("api/catalog", CannedResponse::ok("application/x.cart", json!({ "items": 0 })));
	let router = Router::builder()
		.http_client(client.clone())
		.api_prefix("api/")
		.location(MemoryLocation::new("/legacy/cart"))
		.redirect("/legacy/*", "/catalog")
		.when("application/x.cart", ViewSpec::new())
		.build();

	router.reload(false).await;

	// Only the location moved; the environment drives the next load.
	assert_eq!(router.url(), "api/catalog");
	assert!(router.current().is_none());
	assert_eq!(client.total_hits(), 0);

	router.reload(false).await;

	assert_eq!(router.current().unwrap().url, "api/catalog");
}

// ============================================================================
// API URL Navigation
// ============================================================================

/// Test: set_url maps an API URL back to its view path and loads it
#[tokio::test]
async fn test_set_url_maps_api_url_back_to_view_path() {
	let client = FakeHttpClient::new();
	client.route("api/cart/2", CannedResponse::ok("application/x.cart", json!({ "items": 2 })));
	let router = cart_router(&client, "/");

	router.set_url("api/cart/2", false).await;

	assert_eq!(router.url(), "api/cart/2");
	assert_eq!(router.current().unwrap().url, "api/cart/2");
}

/// Test: URLs outside the API space are ignored
#[tokio::test]
async fn test_set_url_ignores_foreign_urls() {
	let client = FakeHttpClient::new();
	let router = cart_router(&client, "/cart/1");

	router.set_url("https://elsewhere/cart", false).await;

	assert_eq!(router.url(), "api/cart/1");
	assert_eq!(client.total_hits(), 0);
}

/// Test: setting the current URL again only reloads when asked to
#[tokio::test]
async fn test_set_url_same_path_reloads_only_when_asked() {
	let client = FakeHttpClient::new();
	client.route("api/cart/1", CannedResponse::ok("application/x.cart", json!({ "items": 3 })));
	let router = cart_router(&client, "/cart/1");

	router.reload(false).await;
	assert_eq!(client.hits("api/cart/1"), 1);

	router.set_url("api/cart/1", false).await;
	assert_eq!(client.hits("api/cart/1"), 1);

	router.set_url("api/cart/1", true).await;
	assert_eq!(client.hits("api/cart/1"), 2);
}

// ============================================================================
// Location Change Notifications
// ============================================================================

/// Test: routeChangeStart carries the target URL and can cancel the change
#[tokio::test]
async fn test_location_change_start_carries_target_and_cancels() {
	let client = FakeHttpClient::new();
	let router = cart_router(&client, "/cart/1");

	let seen = Arc::new(parking_lot::Mutex::new(None::<String>));
	let seen_in_listener = Arc::clone(&seen);
	let _guard = router.on(ROUTE_CHANGE_START, move |event, payload| {
		*seen_in_listener.lock() = payload.location().map(str::to_string);
		event.prevent_default();
	});

	let may_proceed = router.handle_location_change_start("/next");

	assert!(!may_proceed);
	assert_eq!(seen.lock().as_deref(), Some("/next"));
}

/// Test: the location-changed notification forces a reload
#[tokio::test]
async fn test_location_changed_notification_reloads() {
	let client = FakeHttpClient::new();
	client.route("api/cart/1", CannedResponse::ok("application/x.cart", json!({ "items": 3 })));
	let router = cart_router(&client, "/cart/1");

	router.handle_location_changed().await;

	assert_eq!(router.current().unwrap().url, "api/cart/1");
}

// ============================================================================
// Configuration Spillover
// ============================================================================

/// Test: global defaults show up on the loaded view
#[tokio::test]
async fn test_global_defaults_visible_on_loaded_view() {
	let client = FakeHttpClient::new();
	client.route("api/cart/1", CannedResponse::ok("application/x.cart", json!({})));
	let router = Router::builder()
		.http_client(client.clone())
		.api_prefix("api/")
		.location(MemoryLocation::new("/cart/1"))
		.global(ViewSpec::new().controller_as("ctrl"))
		.when("application/x.cart", ViewSpec::new().controller("CartCtrl"))
		.build();

	router.reload(false).await;

	let current = router.current().unwrap();
	let view = current.view.as_ref().unwrap();
	assert_eq!(view.controller(), Some("CartCtrl"));
	assert_eq!(view.controller_as(), Some("ctrl"));
}

/// Test: prepare_view on the router leaves the current route alone
#[tokio::test]
async fn test_prepare_view_is_detached_from_the_current_route() {
	let client = FakeHttpClient::new();
	client.route("api/cart/9", CannedResponse::ok("application/x.cart", json!({ "items": 9 })));
	let router = cart_router(&client, "/");
	let success = EventProbe::on(router.events(), ROUTE_CHANGE_SUCCESS);

	let detached = router.prepare_view("api/cart/9", None, false).await.unwrap();

	assert_eq!(detached.data, json!({ "items": 9 }));
	assert!(router.current().is_none());
	assert_eq!(success.count(), 0);
}
