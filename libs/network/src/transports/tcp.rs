//! TCP Publish/Subscribe Transport
//!
//! Stream sockets carrying length-prefixed frames, driven by a tokio runtime
//! owned by each endpoint. Callers stay synchronous: they only touch
//! high-water-mark queues, and the runtime's tasks do the socket I/O.
//!
//! - **Subscriber**: one reader task pushes frames into a queue of
//!   `high_water_mark` slots. When it is full the task waits, stops draining
//!   the socket, and TCP flow control pushes back on the publisher.
//! - **Publisher**: an accept task plus one writer task per subscriber, each
//!   draining a queue of `high_water_mark` frames. When a queue is full the
//!   frame is dropped for that subscriber only; a slow consumer never stalls
//!   the others.
//!
//! Dropping either endpoint stops its tasks and closes its sockets. Endpoints
//! must not be dropped from inside another tokio runtime.

use super::queue::{queue, Offer, QueueReceiver, QueueSender};
use super::{MessageSource, TransportStats};
use crate::config::{PublisherConfig, SubscriberConfig};
use crate::framing::{read_frame, write_frame};
use crate::{Result, TransportError};
use parking_lot::Mutex;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::runtime::Runtime;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

fn endpoint_runtime(thread_name: &str) -> Result<Runtime> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .thread_name(thread_name)
        .enable_all()
        .build()?;
    Ok(runtime)
}

/// Connected subscriber socket
///
/// Owns the socket, its reader task and the runtime driving it; not `Clone`.
pub struct TcpSubscription {
    peer_addr: SocketAddr,
    frames: QueueReceiver<Vec<u8>>,
    reader: JoinHandle<()>,
    stats: TransportStats,
    runtime: Runtime,
}

impl TcpSubscription {
    /// Connect to a publisher and start receiving every message it sends
    pub fn connect(config: &SubscriberConfig) -> Result<Self> {
        let addr = config.socket_addr()?;
        let runtime = endpoint_runtime("readout-sub")?;
        debug!("Connecting to publisher at {}", addr);

        let stream = runtime
            .block_on(async { tokio::time::timeout(CONNECT_TIMEOUT, TcpStream::connect(addr)).await })
            .map_err(|_| TransportError::connection("Timed out connecting to publisher", Some(addr)))?
            .map_err(|e| {
                TransportError::connection_with_source("Failed to connect to publisher", Some(addr), e)
            })?;
        if let Err(e) = stream.set_nodelay(true) {
            warn!("Failed to set TCP_NODELAY: {}", e);
        }

        let (sender, frames) = queue(config.high_water_mark);
        let reader = runtime.spawn(read_loop(stream, sender, config.max_message_size, addr));

        info!(
            peer = %addr,
            high_water_mark = config.high_water_mark,
            "📡 Subscribed to publisher"
        );

        Ok(Self {
            peer_addr: addr,
            frames,
            reader,
            stats: TransportStats::default(),
            runtime,
        })
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    /// Messages and bytes handed to the caller so far
    pub fn stats(&self) -> TransportStats {
        self.stats
    }

    fn record(&mut self, frame: &[u8]) {
        self.stats.messages += 1;
        self.stats.bytes += frame.len() as u64;
    }
}

impl MessageSource for TcpSubscription {
    fn receive(&mut self) -> Result<Vec<u8>> {
        match self.frames.blocking_recv() {
            Some(frame) => {
                self.record(&frame);
                Ok(frame)
            }
            None => Err(TransportError::closed("publisher connection ended")),
        }
    }

    fn receive_timeout(&mut self, timeout: Duration) -> Result<Option<Vec<u8>>> {
        let frames = &mut self.frames;
        let received = self
            .runtime
            .block_on(async { tokio::time::timeout(timeout, frames.recv()).await });
        match received {
            Ok(Some(frame)) => {
                self.record(&frame);
                Ok(Some(frame))
            }
            Ok(None) => Err(TransportError::closed("publisher connection ended")),
            Err(_) => Ok(None),
        }
    }
}

impl Drop for TcpSubscription {
    fn drop(&mut self) {
        // Aborting drops the socket with the task
        self.reader.abort();
        debug!(
            peer = %self.peer_addr,
            messages = self.stats.messages,
            "Subscription closed"
        );
    }
}

async fn read_loop(
    mut stream: TcpStream,
    frames: QueueSender<Vec<u8>>,
    max_size: usize,
    peer: SocketAddr,
) {
    loop {
        match read_frame(&mut stream, max_size).await {
            Ok(Some(frame)) => {
                let terminator = frame.is_empty();
                if !frames.send(frame).await {
                    debug!(peer = %peer, "Subscription consumer gone, stopping reader");
                    return;
                }
                if terminator {
                    debug!(peer = %peer, "Received stream terminator");
                    return;
                }
            }
            Ok(None) => {
                debug!(peer = %peer, "Publisher closed the connection");
                return;
            }
            Err(e) => {
                warn!(peer = %peer, error = %e, "Subscription read failed");
                return;
            }
        }
    }
}

/// One connected subscriber as seen by the publisher
struct SubscriberLink {
    peer_addr: SocketAddr,
    queue: QueueSender<Arc<[u8]>>,
    writer: JoinHandle<()>,
}

/// State shared between the publisher handle and its tasks
struct Shared {
    subscribers: Mutex<Vec<SubscriberLink>>,
    connected: watch::Sender<usize>,
    high_water_mark: u32,
    max_message_size: usize,
}

/// Listening publisher fanning frames out to every connected subscriber
pub struct TcpPublisher {
    local_addr: SocketAddr,
    shared: Arc<Shared>,
    shutdown: watch::Sender<bool>,
    acceptor: Option<JoinHandle<()>>,
    messages: AtomicU64,
    bytes: AtomicU64,
    dropped: AtomicU64,
    runtime: Runtime,
}

impl TcpPublisher {
    /// Bind and start accepting subscribers
    pub fn bind(config: &PublisherConfig) -> Result<Self> {
        let addr = config.socket_addr()?;
        let runtime = endpoint_runtime("readout-pub")?;
        let listener = runtime.block_on(TcpListener::bind(addr)).map_err(|e| {
            TransportError::connection_with_source("Failed to bind publisher", Some(addr), e)
        })?;
        let local_addr = listener.local_addr()?;

        let (connected, _) = watch::channel(0usize);
        let shared = Arc::new(Shared {
            subscribers: Mutex::new(Vec::new()),
            connected,
            high_water_mark: config.high_water_mark,
            max_message_size: config.max_message_size,
        });
        let (shutdown, shutdown_rx) = watch::channel(false);
        let acceptor = runtime.spawn(accept_loop(listener, shared.clone(), shutdown_rx));

        info!(
            address = %local_addr,
            high_water_mark = config.high_water_mark,
            "🚀 Publisher listening"
        );

        Ok(Self {
            local_addr,
            shared,
            shutdown,
            acceptor: Some(acceptor),
            messages: AtomicU64::new(0),
            bytes: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
            runtime,
        })
    }

    /// Address actually bound; resolves port 0
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Queue `payload` for every connected subscriber
    ///
    /// Returns how many subscribers accepted the frame. Subscribers whose
    /// queue is full miss this frame.
    pub fn publish(&self, payload: &[u8]) -> Result<usize> {
        if payload.len() > self.shared.max_message_size {
            return Err(TransportError::FrameTooLarge {
                size: payload.len(),
                limit: self.shared.max_message_size,
            });
        }

        let frame: Arc<[u8]> = Arc::from(payload);
        let mut delivered = 0;
        self.shared.subscribers.lock().retain(|link| match link.queue.offer(frame.clone()) {
            Offer::Queued => {
                delivered += 1;
                true
            }
            Offer::Full => {
                let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                if dropped == 1 || dropped % 1000 == 0 {
                    warn!(
                        peer = %link.peer_addr,
                        dropped,
                        "Subscriber queue at high-water mark, dropping frame"
                    );
                }
                true
            }
            Offer::Closed => {
                info!(peer = %link.peer_addr, "Subscriber disconnected");
                false
            }
        });

        self.messages.fetch_add(1, Ordering::Relaxed);
        self.bytes.fetch_add(payload.len() as u64, Ordering::Relaxed);
        Ok(delivered)
    }

    /// Currently connected subscribers
    pub fn subscriber_count(&self) -> usize {
        *self.shared.connected.borrow()
    }

    /// Block until at least `count` subscribers are connected or `timeout` passes
    pub fn wait_for_subscribers(&self, count: usize, timeout: Duration) -> bool {
        let mut connected = self.shared.connected.subscribe();
        self.runtime.block_on(async {
            matches!(
                tokio::time::timeout(timeout, connected.wait_for(|n| *n >= count)).await,
                Ok(Ok(_))
            )
        })
    }

    /// Frames dropped at a full subscriber queue
    pub fn dropped_frames(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub fn stats(&self) -> TransportStats {
        TransportStats {
            messages: self.messages.load(Ordering::Relaxed),
            bytes: self.bytes.load(Ordering::Relaxed),
            dropped: self.dropped_frames(),
        }
    }

    /// Stop accepting, let writers drain queued frames for up to `linger`, then disconnect
    pub fn close(mut self, linger: Duration) {
        self.shutdown_links(linger);
    }

    fn shutdown_links(&mut self, linger: Duration) {
        let acceptor = match self.acceptor.take() {
            Some(acceptor) => acceptor,
            None => return,
        };
        let _ = self.shutdown.send(true);
        let deadline = tokio::time::Instant::now() + linger;

        let shared = self.shared.clone();
        let count = self.runtime.block_on(async move {
            if let Err(e) = acceptor.await {
                if e.is_panic() {
                    warn!("Publisher accept task panicked");
                }
            }

            let links = std::mem::take(&mut *shared.subscribers.lock());
            let count = links.len();
            for link in links {
                let SubscriberLink {
                    peer_addr,
                    queue,
                    mut writer,
                } = link;
                // Closing the queue lets the writer finish once drained
                drop(queue);
                if tokio::time::timeout_at(deadline, &mut writer).await.is_err() {
                    writer.abort();
                    debug!(peer = %peer_addr, "Linger expired before subscriber drained");
                }
            }
            count
        });

        info!(
            address = %self.local_addr,
            subscribers = count,
            messages = self.messages.load(Ordering::Relaxed),
            dropped = self.dropped_frames(),
            "Publisher closed"
        );
    }
}

impl Drop for TcpPublisher {
    fn drop(&mut self) {
        self.shutdown_links(Duration::ZERO);
    }
}

async fn accept_loop(listener: TcpListener, shared: Arc<Shared>, mut shutdown: watch::Receiver<bool>) {
    loop {
        tokio::select! {
            _ = shutdown.changed() => break,
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    let link = spawn_link(stream, peer, &shared);
                    shared.subscribers.lock().push(link);
                    info!(peer = %peer, "Subscriber connected");
                }
                Err(e) => {
                    warn!(error = %e, "Accept failed");
                    tokio::time::sleep(Duration::from_millis(10)).await;
                }
            },
        }
    }
    debug!("Publisher accept loop stopped");
}

fn spawn_link(stream: TcpStream, peer: SocketAddr, shared: &Arc<Shared>) -> SubscriberLink {
    if let Err(e) = stream.set_nodelay(true) {
        warn!("Failed to set TCP_NODELAY: {}", e);
    }

    let (queue, frames) = queue::<Arc<[u8]>>(shared.high_water_mark);
    // Count before the writer exists so its exit can never undercount
    shared.connected.send_modify(|n| *n += 1);
    let writer = tokio::spawn(write_loop(stream, frames, shared.clone(), peer));

    SubscriberLink {
        peer_addr: peer,
        queue,
        writer,
    }
}

async fn write_loop(
    mut stream: TcpStream,
    mut frames: QueueReceiver<Arc<[u8]>>,
    shared: Arc<Shared>,
    peer: SocketAddr,
) {
    while let Some(frame) = frames.recv().await {
        if let Err(e) = write_frame(&mut stream, &frame, shared.max_message_size).await {
            if e.is_closed() {
                debug!(peer = %peer, error = %e, "Subscriber went away");
            } else {
                warn!(peer = %peer, error = %e, "Failed to write frame to subscriber");
            }
            break;
        }
    }
    shared.connected.send_modify(|n| *n = n.saturating_sub(1));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn publisher(high_water_mark: u32) -> TcpPublisher {
        TcpPublisher::bind(&PublisherConfig::new("127.0.0.1:0").with_high_water_mark(high_water_mark))
            .unwrap()
    }

    fn subscribe(publisher: &TcpPublisher) -> TcpSubscription {
        let config = SubscriberConfig::new(publisher.local_addr().to_string()).with_high_water_mark(16);
        let subscription = TcpSubscription::connect(&config).unwrap();
        assert!(publisher.wait_for_subscribers(1, Duration::from_secs(5)));
        subscription
    }

    #[test]
    fn test_frames_arrive_in_order() {
        let publisher = publisher(64);
        let mut subscription = subscribe(&publisher);

        for i in 0..10u8 {
            assert_eq!(publisher.publish(&[i; 3]).unwrap(), 1);
        }
        for i in 0..10u8 {
            assert_eq!(subscription.receive().unwrap(), vec![i; 3]);
        }
        assert_eq!(subscription.stats().messages, 10);
        assert_eq!(subscription.stats().bytes, 30);
    }

    #[test]
    fn test_receive_timeout_reports_pending() {
        let publisher = publisher(8);
        let mut subscription = subscribe(&publisher);
        assert_eq!(
            subscription.receive_timeout(Duration::from_millis(20)).unwrap(),
            None
        );
        publisher.publish(b"late").unwrap();
        assert_eq!(
            subscription.receive_timeout(Duration::from_secs(5)).unwrap(),
            Some(b"late".to_vec())
        );
    }

    #[test]
    fn test_wait_for_subscribers_times_out() {
        let publisher = publisher(8);
        assert_eq!(publisher.subscriber_count(), 0);
        assert!(!publisher.wait_for_subscribers(1, Duration::from_millis(20)));
    }

    #[test]
    fn test_publisher_drop_ends_subscription() {
        let publisher = publisher(8);
        let mut subscription = subscribe(&publisher);
        drop(publisher);
        let err = subscription.receive().unwrap_err();
        assert!(err.is_closed());
    }

    #[test]
    fn test_close_drains_queued_frames() {
        let publisher = publisher(8);
        let mut subscription = subscribe(&publisher);
        publisher.publish(b"one").unwrap();
        publisher.publish(&[]).unwrap();
        publisher.close(Duration::from_secs(5));

        assert_eq!(subscription.receive().unwrap(), b"one".to_vec());
        assert_eq!(subscription.receive().unwrap(), Vec::<u8>::new());
        assert!(subscription.receive().is_err());
    }

    #[test]
    fn test_departed_subscriber_is_forgotten() {
        let publisher = publisher(8);
        let subscription = subscribe(&publisher);
        assert_eq!(publisher.subscriber_count(), 1);
        drop(subscription);

        // the writer notices on its next failed write and closes its queue
        let mut delivered = 1;
        for _ in 0..200 {
            delivered = publisher.publish(&[0u8; 64 * 1024]).unwrap();
            if delivered == 0 {
                break;
            }
            thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(delivered, 0);
        assert_eq!(publisher.subscriber_count(), 0);
    }

    #[test]
    fn test_oversize_publish_rejected() {
        let config = PublisherConfig {
            bind_address: "127.0.0.1:0".to_string(),
            high_water_mark: 4,
            max_message_size: 8,
        };
        let publisher = TcpPublisher::bind(&config).unwrap();
        assert!(matches!(
            publisher.publish(&[0; 9]),
            Err(TransportError::FrameTooLarge { size: 9, limit: 8 })
        ));
    }

    #[test]
    fn test_connect_without_publisher_fails() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let result = TcpSubscription::connect(&SubscriberConfig::new(format!("127.0.0.1:{}", port)));
        assert!(matches!(result, Err(TransportError::Connection { .. })));
    }

    #[test]
    fn test_subscription_drop_does_not_hang_with_full_queue() {
        let publisher = publisher(1024);
        let config = SubscriberConfig::new(publisher.local_addr().to_string()).with_high_water_mark(1);
        let subscription = TcpSubscription::connect(&config).unwrap();
        assert!(publisher.wait_for_subscribers(1, Duration::from_secs(5)));
        for _ in 0..16 {
            publisher.publish(b"frame").unwrap();
        }
        thread::sleep(Duration::from_millis(50));
        drop(subscription);
    }
}
