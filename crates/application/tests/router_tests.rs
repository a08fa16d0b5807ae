use application::printer::{Broadcast, RouterExit, SocketEventRouter};
use domain::PrinterState;
use std::io;
use tokio::time::Duration;
use tokio_util::sync::CancellationToken;

fn drain(rx: &mut tokio::sync::broadcast::Receiver<PrinterState>) -> Vec<PrinterState> {
    let mut seen = Vec::new();
    while let Ok(state) = rx.try_recv() {
        seen.push(state);
    }
    seen
}

#[tokio::test]
async fn test_status_bytes_become_printer_states() {
    let channel = Broadcast::new("printer_state");
    let mut rx = channel.subscribe();

    let reader = tokio_test::io::Builder::new()
        .read(&[0x08])
        .read(&[0x08])
        .read(&[0x00])
        .build();

    let exit = SocketEventRouter::new(reader, channel.clone(), "10.0.0.5:9100")
        .run(CancellationToken::new())
        .await;

    assert_eq!(exit, RouterExit::Closed);
    assert_eq!(
        drain(&mut rx),
        vec![
            PrinterState::Printing,
            PrinterState::Printing,
            PrinterState::Finished,
            PrinterState::Stopped,
        ]
    );
}

#[tokio::test]
async fn test_only_first_byte_of_a_message_counts() {
    let channel = Broadcast::new("printer_state");
    let mut rx = channel.subscribe();

    // Busy bit lives in the leading byte only
    let reader = tokio_test::io::Builder::new().read(&[0x00, 0x08, 0x08]).build();

    SocketEventRouter::new(reader, channel.clone(), "10.0.0.5:9100")
        .run(CancellationToken::new())
        .await;

    assert_eq!(
        drain(&mut rx),
        vec![PrinterState::Finished, PrinterState::Stopped]
    );
}

#[tokio::test]
async fn test_read_error_publishes_error() {
    let channel = Broadcast::new("printer_state");
    let mut rx = channel.subscribe();

    let reader = tokio_test::io::Builder::new()
        .read(&[0x08])
        .read_error(io::Error::new(io::ErrorKind::ConnectionReset, "reset by peer"))
        .build();

    let exit = SocketEventRouter::new(reader, channel.clone(), "10.0.0.5:9100")
        .run(CancellationToken::new())
        .await;

    assert!(matches!(exit, RouterExit::Failed(ref e) if e.contains("reset by peer")));
    assert_eq!(drain(&mut rx), vec![PrinterState::Printing, PrinterState::Error]);
}

#[tokio::test]
async fn test_cancel_stops_without_publishing() {
    let channel = Broadcast::new("printer_state");
    let mut rx = channel.subscribe();

    // Socket that never delivers anything
    let (local, _device) = tokio::io::duplex(64);
    let cancel = CancellationToken::new();
    let handle = tokio::spawn(
        SocketEventRouter::new(local, channel.clone(), "10.0.0.5:9100").run(cancel.clone()),
    );

    tokio::time::sleep(Duration::from_millis(20)).await;
    cancel.cancel();

    let exit = handle.await.unwrap();
    assert_eq!(exit, RouterExit::Cancelled);
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test]
async fn test_no_subscribers_is_fine() {
    let channel = Broadcast::new("printer_state");
    let reader = tokio_test::io::Builder::new().read(&[0x08]).build();

    let exit = SocketEventRouter::new(reader, channel, "10.0.0.5:9100")
        .run(CancellationToken::new())
        .await;

    assert_eq!(exit, RouterExit::Closed);
}
