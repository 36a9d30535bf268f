use std::net::TcpListener;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use stagewire_frame::{Frame, FrameError, FrameReader, FrameWriter};
use stagewire_session::{ConnectionState, Session, SessionConfig, SessionError, StageRequest};

fn loopback_listener() -> (TcpListener, u16) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("loopback listener should bind");
    let port = listener
        .local_addr()
        .expect("listener should have an address")
        .port();
    (listener, port)
}

/// Accept one client, read the four request frames, reply with `stage`.
fn spawn_stage_server(listener: TcpListener, stage: Vec<u8>) -> thread::JoinHandle<Vec<Vec<u8>>> {
    thread::spawn(move || {
        let (stream, _) = listener.accept().expect("server should accept");
        let mut reader = FrameReader::new(stream.try_clone().expect("stream should clone"));
        let mut writer = FrameWriter::new(stream);

        let requests: Vec<Vec<u8>> = (0..4)
            .map(|_| {
                reader
                    .read_frame()
                    .expect("request frame should arrive")
                    .payload()
                    .to_vec()
            })
            .collect();
        writer.send(&stage).expect("stage should send");
        requests
    })
}

#[test]
fn get_stage_over_loopback() {
    let (listener, port) = loopback_listener();
    let stage: Vec<u8> = (0..300 * 1024).map(|i| (i % 253) as u8).collect();
    let server = spawn_stage_server(listener, stage.clone());

    let mut session = Session::new();
    session
        .connect("127.0.0.1", port)
        .expect("session should connect");
    assert!(session.is_connected());
    assert_eq!(session.host(), "127.0.0.1");
    assert_eq!(session.port(), port);

    let received = session.get_stage("x64").expect("stage should arrive");

    assert_eq!(received.payload().as_ref(), stage.as_slice());
    assert_eq!(session.last_stage(), Some(&received));

    let requests = server.join().expect("server thread should complete");
    assert_eq!(
        requests,
        vec![
            b"arch=x64".to_vec(),
            b"pipename=beacon".to_vec(),
            b"block=100".to_vec(),
            b"go".to_vec(),
        ]
    );
}

#[test]
fn get_stage_with_custom_channel() {
    let (listener, port) = loopback_listener();
    let server = spawn_stage_server(listener, b"tiny".to_vec());

    let mut session = Session::new();
    session
        .connect("127.0.0.1", port)
        .expect("session should connect");
    let request = StageRequest::new("x86")
        .with_pipename("relay-2")
        .with_block("1000");
    session
        .get_stage_with(&request)
        .expect("stage should arrive");

    let requests = server.join().expect("server thread should complete");
    assert_eq!(requests[0], b"arch=x86");
    assert_eq!(requests[1], b"pipename=relay-2");
    assert_eq!(requests[2], b"block=1000");
    assert_eq!(requests[3], b"go");
}

#[test]
fn raw_frames_use_exact_wire_bytes() {
    let (listener, port) = loopback_listener();
    let server = thread::spawn(move || {
        use std::io::{Read, Write};

        let (mut stream, _) = listener.accept().expect("server should accept");
        let mut buf = [0u8; 9];
        stream.read_exact(&mut buf).expect("hello frame should arrive");
        // Reply one byte at a time to force partial reads on the client.
        for byte in buf {
            stream.write_all(&[byte]).expect("reply byte should send");
            stream.flush().expect("flush should succeed");
        }
        buf
    });

    let mut session = Session::new();
    session
        .connect("127.0.0.1", port)
        .expect("session should connect");
    session
        .send_frame(&Frame::new(&b"hello"[..]))
        .expect("frame should send");
    let echoed = session.receive_frame().expect("frame should arrive");

    assert_eq!(echoed.payload().as_ref(), b"hello");
    let seen = server.join().expect("server thread should complete");
    assert_eq!(seen, [0x05, 0x00, 0x00, 0x00, 0x68, 0x65, 0x6c, 0x6c, 0x6f]);
}

#[test]
fn connect_refused_is_connection_error() {
    let (listener, port) = loopback_listener();
    drop(listener);

    let mut session = Session::new();
    let err = session.connect("127.0.0.1", port).unwrap_err();

    assert!(matches!(err, SessionError::Connection(_)));
    assert!(!session.is_connected());
    assert_eq!(session.state(), ConnectionState::Failed);
    assert_eq!(session.host(), "");
}

#[test]
fn second_connect_is_rejected() {
    let (listener, port) = loopback_listener();

    let mut session = Session::new();
    session
        .connect("127.0.0.1", port)
        .expect("session should connect");
    let _server = listener.accept().expect("server should accept");

    let err = session.connect("127.0.0.1", port).unwrap_err();
    assert!(matches!(err, SessionError::AlreadyConnected));
    assert!(session.is_connected());
}

#[test]
fn silent_peer_times_out() {
    let (listener, port) = loopback_listener();
    let (done_tx, done_rx) = mpsc::channel::<()>();
    let server = thread::spawn(move || {
        let (_stream, _) = listener.accept().expect("server should accept");
        let _ = done_rx.recv_timeout(Duration::from_secs(10));
    });

    let mut session = Session::with_config(SessionConfig {
        io_timeout: Duration::from_millis(200),
        ..SessionConfig::default()
    });
    session
        .connect("127.0.0.1", port)
        .expect("session should connect");

    let err = session.receive_frame().unwrap_err();

    assert!(matches!(err, SessionError::Transport(FrameError::TimedOut)));
    assert_eq!(session.state(), ConnectionState::Failed);

    done_tx.send(()).expect("server should be waiting");
    server.join().expect("server thread should complete");
}

#[test]
fn peer_closing_mid_stage_is_transport_error() {
    let (listener, port) = loopback_listener();
    let server = thread::spawn(move || {
        use std::io::Write;

        let (stream, _) = listener.accept().expect("server should accept");
        let mut reader = FrameReader::new(stream.try_clone().expect("stream should clone"));
        for _ in 0..4 {
            reader.read_frame().expect("request frame should arrive");
        }
        let mut stream = stream;
        // Promise 100 bytes, deliver 3, hang up.
        stream
            .write_all(&[100, 0, 0, 0, 1, 2, 3])
            .expect("partial stage should send");
    });

    let mut session = Session::new();
    session
        .connect("127.0.0.1", port)
        .expect("session should connect");
    let err = session.get_stage("x64").unwrap_err();
    server.join().expect("server thread should complete");

    assert!(matches!(
        err,
        SessionError::Transport(FrameError::ConnectionClosed)
    ));
    assert!(session.last_stage().is_none());
    assert!(!session.is_connected());
}

#[test]
fn failed_session_can_reconnect() {
    let (listener, port) = loopback_listener();
    drop(listener);

    let mut session = Session::new();
    assert!(session.connect("127.0.0.1", port).is_err());

    let (listener, port) = loopback_listener();
    session
        .connect("127.0.0.1", port)
        .expect("fresh connect should succeed");
    let _server = listener.accept().expect("server should accept");

    assert_eq!(session.state(), ConnectionState::Connected);
}
