use minikv::server::run;
use redis::aio::MultiplexedConnection;
use serial_test::serial;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::{sleep, timeout, Duration};

// Each test binds its own port so a shut-down server from one test cannot
// interfere with the next.
async fn spawn_server(port: u16) -> tokio::task::JoinHandle<Result<(), minikv::Error>> {
    let handle = tokio::spawn(run(port));
    sleep(Duration::from_millis(100)).await;
    handle
}

async fn connect(port: u16) -> MultiplexedConnection {
    spawn_server(port).await;

    let client = redis::Client::open(format!("redis://127.0.0.1:{port}/")).unwrap();
    client.get_multiplexed_async_connection().await.unwrap()
}

async fn connect_raw(port: u16) -> TcpStream {
    spawn_server(port).await;
    TcpStream::connect(("127.0.0.1", port)).await.unwrap()
}

/// Write raw RESP bytes and read back one reply.
async fn send_raw(stream: &mut TcpStream, request: &[u8]) -> Vec<u8> {
    stream.write_all(request).await.unwrap();

    let mut reply = Vec::new();
    let mut buf = [0u8; 1024];
    loop {
        let n = stream.read(&mut buf).await.unwrap();
        assert!(n > 0, "server closed the connection unexpectedly");
        reply.extend_from_slice(&buf[..n]);
        if reply.ends_with(b"\r\n") {
            return reply;
        }
    }
}

#[tokio::test]
#[serial]
async fn test_set_and_get() {
    let mut conn = connect(6390).await;

    let reply: String = redis::cmd("SET")
        .arg("x")
        .arg("1")
        .query_async(&mut conn)
        .await
        .unwrap();
    assert_eq!(reply, "OK");

    let value: Option<String> = redis::cmd("GET").arg("x").query_async(&mut conn).await.unwrap();
    assert_eq!(value, Some("1".to_string()));

    let missing: Option<String> = redis::cmd("GET")
        .arg("missing")
        .query_async(&mut conn)
        .await
        .unwrap();
    assert_eq!(missing, None);
}

#[tokio::test]
#[serial]
async fn test_del() {
    let mut conn = connect(6391).await;

    for key in ["del_key_1", "del_key_2", "del_key_3"] {
        let _: String = redis::cmd("SET")
            .arg(key)
            .arg("1")
            .query_async(&mut conn)
            .await
            .unwrap();
    }

    // Two present keys and one absent one: only the removed keys count.
    let removed: i64 = redis::cmd("DEL")
        .arg("del_key_1")
        .arg("del_key_2")
        .arg("del_nonexistent")
        .query_async(&mut conn)
        .await
        .unwrap();
    assert_eq!(removed, 2);

    let removed: i64 = redis::cmd("DEL")
        .arg("del_nonexistent")
        .query_async(&mut conn)
        .await
        .unwrap();
    assert_eq!(removed, 0);

    let value: Option<String> = redis::cmd("GET")
        .arg("del_key_1")
        .query_async(&mut conn)
        .await
        .unwrap();
    assert_eq!(value, None);

    let value: Option<String> = redis::cmd("GET")
        .arg("del_key_3")
        .query_async(&mut conn)
        .await
        .unwrap();
    assert_eq!(value, Some("1".to_string()));
}

#[tokio::test]
#[serial]
async fn test_set_get_modifier() {
    let mut conn = connect(6392).await;

    // No previous value: the GET-mode reply is nil.
    let previous: Option<String> = redis::cmd("SET")
        .arg("mod_key")
        .arg("1")
        .arg("GET")
        .query_async(&mut conn)
        .await
        .unwrap();
    assert_eq!(previous, None);

    let previous: Option<String> = redis::cmd("SET")
        .arg("mod_key")
        .arg("2")
        .arg("GET")
        .query_async(&mut conn)
        .await
        .unwrap();
    assert_eq!(previous, Some("1".to_string()));

    let value: Option<String> = redis::cmd("GET")
        .arg("mod_key")
        .query_async(&mut conn)
        .await
        .unwrap();
    assert_eq!(value, Some("2".to_string()));
}

#[tokio::test]
#[serial]
async fn test_command_introspection_stub() {
    let mut conn = connect(6393).await;

    let reply: Vec<String> = redis::cmd("COMMAND").query_async(&mut conn).await.unwrap();
    assert!(reply.is_empty());
}

#[tokio::test]
#[serial]
async fn test_unsupported_command() {
    let mut conn = connect(6394).await;

    let err = redis::cmd("FOO")
        .query_async::<_, String>(&mut conn)
        .await
        .unwrap_err();
    assert_eq!(err.detail(), Some("Unsupported command"));
}

#[tokio::test]
#[serial]
async fn test_malformed_request_keeps_connection_usable() {
    let mut stream = connect_raw(6395).await;

    // A top-level simple string is not an array of bulk strings.
    let reply = send_raw(&mut stream, b"+PING\r\n").await;
    assert_eq!(
        reply,
        b"-ERR Client request must be an array of bulk strings.\r\n"
    );

    // An array with a non-bulk element is rejected the same way.
    let reply = send_raw(&mut stream, b"*2\r\n$3\r\nGET\r\n:42\r\n").await;
    assert_eq!(
        reply,
        b"-ERR Client request must be an array of bulk strings.\r\n"
    );

    // The connection survives both rejections.
    let reply = send_raw(&mut stream, b"*3\r\n$3\r\nSET\r\n$1\r\nx\r\n$1\r\n1\r\n").await;
    assert_eq!(reply, b"+OK\r\n");

    let reply = send_raw(&mut stream, b"*2\r\n$3\r\nGET\r\n$1\r\nx\r\n").await;
    assert_eq!(reply, b"$1\r\n1\r\n");
}

#[tokio::test]
#[serial]
async fn test_nil_arguments() {
    let mut stream = connect_raw(6396).await;

    let reply = send_raw(&mut stream, b"*2\r\n$3\r\nGET\r\n$-1\r\n").await;
    assert_eq!(reply, b"-ERR A nil key is not allowed.\r\n");

    let reply = send_raw(&mut stream, b"*3\r\n$3\r\nSET\r\n$-1\r\n$1\r\n1\r\n").await;
    assert_eq!(reply, b"-ERR A nil key is not allowed.\r\n");

    let reply = send_raw(&mut stream, b"*3\r\n$3\r\nSET\r\n$1\r\nk\r\n$-1\r\n").await;
    assert_eq!(reply, b"-ERR A nil value is not allowed\r\n");

    // Nil DEL keys are skipped, not errors.
    let reply = send_raw(&mut stream, b"*3\r\n$3\r\nDEL\r\n$-1\r\n$-1\r\n").await;
    assert_eq!(reply, b":0\r\n");
}

#[tokio::test]
#[serial]
async fn test_missing_arguments_are_fatal_per_request() {
    let mut stream = connect_raw(6397).await;

    let reply = send_raw(&mut stream, b"*1\r\n$3\r\nGET\r\n").await;
    assert_eq!(reply, b"-ERR A GET command requires a key argument.\r\n");

    let reply = send_raw(&mut stream, b"*2\r\n$3\r\nSET\r\n$1\r\nk\r\n").await;
    assert_eq!(
        reply,
        b"-ERR A SET command requires key and value arguments.\r\n"
    );

    let reply = send_raw(&mut stream, b"*1\r\n$3\r\nDEL\r\n").await;
    assert_eq!(
        reply,
        b"-ERR A DEL command requires at least one key argument.\r\n"
    );

    // The rejected SET never touched the store.
    let reply = send_raw(&mut stream, b"*2\r\n$3\r\nGET\r\n$1\r\nk\r\n").await;
    assert_eq!(reply, b"$-1\r\n");
}

#[tokio::test]
#[serial]
async fn test_concurrent_sets_on_the_same_key() {
    spawn_server(6398).await;

    let client = redis::Client::open("redis://127.0.0.1:6398/").unwrap();
    let mut conn_a = client.get_multiplexed_async_connection().await.unwrap();
    let mut conn_b = client.get_multiplexed_async_connection().await.unwrap();

    let set_a = async {
        let _: String = redis::cmd("SET")
            .arg("race")
            .arg("a")
            .query_async(&mut conn_a)
            .await
            .unwrap();
    };
    let set_b = async {
        let _: String = redis::cmd("SET")
            .arg("race")
            .arg("b")
            .query_async(&mut conn_b)
            .await
            .unwrap();
    };
    tokio::join!(set_a, set_b);

    // Whichever write the store serialized last wins; the value is never torn.
    let value: Option<String> = redis::cmd("GET")
        .arg("race")
        .query_async(&mut conn_a)
        .await
        .unwrap();
    assert!(value == Some("a".to_string()) || value == Some("b".to_string()));
}

#[tokio::test]
#[serial]
async fn test_shutdown_acknowledges_before_terminating() {
    let server = spawn_server(6399).await;
    let mut stream = TcpStream::connect(("127.0.0.1", 6399)).await.unwrap();

    let reply = send_raw(&mut stream, b"*1\r\n$8\r\nSHUTDOWN\r\n").await;
    assert_eq!(reply, b"+OK\r\n");

    // The accept loop observes the latch and returns cleanly.
    let result = timeout(Duration::from_secs(1), server)
        .await
        .expect("server should stop after SHUTDOWN")
        .unwrap();
    assert!(result.is_ok());
}
