//! Blocking facade tests.
//!
//! The blocking client owns its own runtime, so these tests are plain
//! `#[test]` functions; the mock server runs on a separate runtime kept
//! alive for the duration of the test.

use std::time::Duration;

use tokio::runtime::Runtime;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use interpals_client::{blocking, SearchOptions, Session};

fn session() -> Session {
    Session::new("anna", "sid-123", "csrf-456")
}

fn start_server(rt: &Runtime) -> MockServer {
    rt.block_on(MockServer::start())
}

#[test]
fn blocking_profile_round_trip() {
    let server_rt = Runtime::new().unwrap();
    let server = start_server(&server_rt);
    server_rt.block_on(
        Mock::given(method("GET"))
            .and(path("/absonoplyanka"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(include_str!("fixtures/profile.html")),
            )
            .mount(&server),
    );

    let client = blocking::Client::with_base_url(session(), server.uri()).unwrap();
    let profile = client.profile("absonoplyanka").unwrap();
    assert_eq!(profile.username, "Absonoplyanka");
    assert_eq!(profile.uid, "7341288");
}

#[test]
fn blocking_search_iterator_stops_after_the_last_page() {
    let server_rt = Runtime::new().unwrap();
    let server = start_server(&server_rt);

    let page = r#"<html><body><a href="/app/auth/logout">x</a>
        <div class="sResInner"><div class="sResMain"><b><a href="/mina">mina</a></b></div></div>
        <div class="sResInner"><div class="sResMain"><b><a href="/olga">olga</a></b></div></div>
        </body></html>"#;
    let empty = r#"<html><body><a href="/app/auth/logout">x</a></body></html>"#;
    let form = r#"<html><head><meta name="csrf_token" content="tok"></head>
        <body><a href="/app/auth/logout">x</a></body></html>"#;

    server_rt.block_on(async {
        Mock::given(method("GET"))
            .and(path("/app/search"))
            .and(query_param("offset", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_string(page))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/app/search"))
            .and(query_param("offset", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_string(empty))
            .mount(&server)
            .await;
        // The bare form request carries no offset; mounted last so the
        // page mocks take precedence.
        Mock::given(method("GET"))
            .and(path("/app/search"))
            .respond_with(ResponseTemplate::new(200).set_body_string(form))
            .mount(&server)
            .await;
    });

    let client = blocking::Client::with_base_url(session(), server.uri()).unwrap();
    let results: Vec<_> = client
        .search(&SearchOptions::default(), 10, Duration::ZERO)
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].username, "mina");
    assert_eq!(results[1].username, "olga");
}

#[test]
fn blocking_friend_add_follows_the_redirect_protocol() {
    let server_rt = Runtime::new().unwrap();
    let server = start_server(&server_rt);
    server_rt.block_on(
        Mock::given(method("GET"))
            .and(path("/app/friends/add"))
            .respond_with(ResponseTemplate::new(302).insert_header("location", "/anna"))
            .mount(&server),
    );

    let client = blocking::Client::with_base_url(session(), server.uri()).unwrap();
    client.friend_add("9").unwrap();
}
