//! End-to-end tests through the hyper front end.

use sprig_core::*;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

mod greet {
    use sprig_core::*;

    #[derive(Default)]
    pub struct GreetAction;

    impl Component for GreetAction {}

    impl Controller for GreetAction {
        fn request_mapping() -> &'static str {
            "/greet"
        }

        fn handlers() -> Vec<HandlerMethod<Self>> {
            vec![
                HandlerMethod::new("hello", "/hello", GreetAction::hello)
                    .param(Param::named("name", TypeTag::Text)),
                HandlerMethod::new("count", "/count", GreetAction::count)
                    .param(Param::named("n", TypeTag::Integer)),
            ]
        }
    }

    impl GreetAction {
        fn hello(&self, args: &mut Arguments<'_>) -> HandlerResult {
            let name: String = args.require(0)?;
            Ok(Some(format!("Hello {}", name)))
        }

        fn count(&self, args: &mut Arguments<'_>) -> HandlerResult {
            let n: i64 = args.require(0)?;
            Ok(Some(n.to_string()))
        }
    }

    sprig_core::controller!(GreetAction);
}

async fn start(config: ContextConfig) -> std::net::SocketAddr {
    start_with_limit(config, DEFAULT_BODY_LIMIT).await
}

async fn start_with_limit(config: ContextConfig, body_limit: usize) -> std::net::SocketAddr {
    let context = ApplicationContext::bootstrap(config).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(
        Application::new(context)
            .with_body_limit(body_limit)
            .serve(listener),
    );
    addr
}

async fn send(addr: std::net::SocketAddr, raw: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(raw.as_bytes()).await.unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();
    response
}

#[tokio::test]
async fn test_get_with_query() {
    let addr = start(ContextConfig::new("http_tests.greet")).await;
    let response = send(
        addr,
        "GET /greet/hello?name=World HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
    )
    .await;

    assert!(response.starts_with("HTTP/1.1 200 OK"));
    assert!(response.ends_with("Hello World"));
}

#[tokio::test]
async fn test_post_form_body() {
    let addr = start_with_limit(
        ContextConfig::new("http_tests.greet").with_context_path("/app"),
        64,
    )
    .await;
    let body = "name=Form";
    let request = format!(
        "POST /app/greet/hello HTTP/1.1\r\nHost: localhost\r\nContent-Type: application/x-www-form-urlencoded\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        body.len(),
        body
    );

    let response = send(addr, &request).await;
    assert!(response.starts_with("HTTP/1.1 200 OK"));
    assert!(response.ends_with("Hello Form"));
}

#[tokio::test]
async fn test_status_codes() {
    let addr = start(ContextConfig::new("http_tests.greet")).await;

    let missing = send(
        addr,
        "GET /nope HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
    )
    .await;
    assert!(missing.starts_with("HTTP/1.1 404 Not Found"));
    assert!(missing.ends_with(NOT_FOUND_BODY));

    let failed = send(
        addr,
        "GET /greet/count?n=many HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
    )
    .await;
    assert!(failed.starts_with("HTTP/1.1 500 Internal Server Error"));
    assert!(failed.contains(FAILURE_PREFIX));
}
