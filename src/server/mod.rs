//! HTTP front end: every request streams a new animation.

/// Channel-backed blocking writer feeding the response body.
pub mod writer;

use std::{
    future::Future,
    io::{self, BufWriter},
    panic::{self, AssertUnwindSafe},
    sync::Arc,
    time::Duration,
};

use anyhow::Context as _;
use axum::{
    Router,
    body::Body,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    routing::any,
};
use tokio::{net::TcpListener, sync::mpsc, sync::oneshot};

use crate::{
    config::ServerConfig,
    foundation::{core::CancelToken, error::LissajousResult},
    server::writer::{Chunk, ChannelWriter},
    session::Generator,
};

/// How rendered bytes are batched on their way to the response body.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Buffering {
    /// Chunks buffered between the render thread and the socket.
    pub channel_capacity: usize,
    /// Bytes gathered before a chunk is handed to the body.
    pub chunk_size: usize,
}

impl Default for Buffering {
    fn default() -> Self {
        Self {
            channel_capacity: 16,
            chunk_size: 16 * 1024,
        }
    }
}

/// Shared, read-only request state.
#[derive(Clone, Debug)]
pub struct AppState {
    pub generator: Arc<Generator>,
    /// Tripped when the shutdown grace period runs out.
    pub cancel: CancelToken,
    pub buffering: Buffering,
}

impl AppState {
    pub fn new(generator: Generator) -> Self {
        Self {
            generator: Arc::new(generator),
            cancel: CancelToken::new(),
            buffering: Buffering::default(),
        }
    }
}

/// Every path and method is answered with a fresh animation.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", any(lissajous_gif))
        .fallback(lissajous_gif)
        .with_state(state)
}

async fn lissajous_gif(State(state): State<AppState>) -> Response {
    let freq = state.generator.random_frequency(&mut rand::thread_rng());
    tracing::debug!(freq, "rendering animation");

    let buffering = state.buffering;
    let body = spawn_render(buffering, move |out| {
        state
            .generator
            .write_gif(freq, out, &state.cancel)
            .map(drop)
    });
    ([(header::CONTENT_TYPE, "image/gif")], body).into_response()
}

/// Run `render` on the blocking pool and stream whatever it writes as a response body.
///
/// A render that returns an error (other than the client going away) or panics aborts the
/// body, so the client never sees a cleanly terminated but incomplete image.
pub(crate) fn spawn_render<F>(buffering: Buffering, render: F) -> Body
where
    F: FnOnce(BufWriter<ChannelWriter>) -> LissajousResult<()> + Send + 'static,
{
    let (tx, rx) = mpsc::channel::<Chunk>(buffering.channel_capacity.max(1));

    tokio::task::spawn_blocking(move || {
        let writer = ChannelWriter::new(tx);
        let out = BufWriter::with_capacity(buffering.chunk_size, writer.clone());
        match panic::catch_unwind(AssertUnwindSafe(|| render(out))) {
            Ok(Ok(())) => tracing::debug!("response complete"),
            Ok(Err(err)) if err.is_sink_failure() => {
                tracing::debug!(%err, "client went away mid-stream");
            }
            Ok(Err(err)) => {
                tracing::warn!(%err, "gif generation failed");
                writer.abort(io::Error::other(err.to_string()));
            }
            Err(payload) => {
                let msg = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                tracing::error!(panic = %msg, "gif generation panicked");
                writer.abort(io::Error::other(format!("render panicked: {msg}")));
            }
        }
    });

    Body::from_stream(futures::stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|chunk| (chunk, rx))
    }))
}

/// Bind `cfg.listen` and serve until SIGINT/SIGTERM.
pub async fn serve(cfg: ServerConfig) -> anyhow::Result<()> {
    let generator = Generator::new(cfg.animation.clone())?;
    let state = AppState::new(generator);
    let listener = TcpListener::bind(cfg.listen)
        .await
        .with_context(|| format!("bind {}", cfg.listen))?;
    tracing::info!(addr = %listener.local_addr()?, "listening");
    serve_until(listener, state, cfg.grace_period(), shutdown_signal()).await
}

/// Serve on `listener` until `signal` resolves, then drain for at most `grace`.
///
/// Renders still running when the grace period ends are cancelled at their next frame.
pub async fn serve_until<F>(
    listener: TcpListener,
    state: AppState,
    grace: Duration,
    signal: F,
) -> anyhow::Result<()>
where
    F: Future<Output = ()>,
{
    let cancel = state.cancel.clone();
    let app = router(state);
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = stop_rx.await;
            })
            .await
    });

    tokio::select! {
        joined = &mut server => {
            joined.context("server task panicked")?.context("http server failed")?;
            return Ok(());
        }
        () = signal => {}
    }

    tracing::info!("shutting down");
    let _ = stop_tx.send(());
    match tokio::time::timeout(grace, server).await {
        Ok(joined) => {
            joined
                .context("server task panicked")?
                .context("http server shutdown failed")?;
            tracing::info!("shut down cleanly");
        }
        Err(_) => {
            tracing::warn!(?grace, "grace period elapsed, cancelling in-flight renders");
            cancel.cancel();
        }
    }
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(%err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(err) => {
                tracing::error!(%err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU64, Ordering};

    use futures::StreamExt as _;

    use super::*;
    use crate::{
        encode::{
            gif::GifSink,
            sink::{FrameSink, SinkConfig},
        },
        foundation::{
            core::{AnimationParams, FrameIndex},
            error::LissajousError,
        },
        render::quantize::IndexedFrame,
    };

    /// Forwards to `inner`, counting frames and optionally blowing up at one of them.
    struct Counting<S> {
        inner: S,
        pushed: Arc<AtomicU64>,
        panic_at: Option<u64>,
    }

    impl<S: FrameSink> FrameSink for Counting<S> {
        fn begin(&mut self, cfg: SinkConfig) -> LissajousResult<()> {
            self.inner.begin(cfg)
        }

        fn push_frame(&mut self, idx: FrameIndex, frame: &IndexedFrame) -> LissajousResult<()> {
            if self.panic_at == Some(idx.0) {
                panic!("sink failed at frame {}", idx.0);
            }
            self.inner.push_frame(idx, frame)?;
            self.pushed.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn end(&mut self) -> LissajousResult<()> {
            self.inner.end()
        }
    }

    fn generator(nframes: u32) -> Generator {
        Generator::new(AnimationParams {
            size: 20,
            nframes,
            angular_step: 0.01,
            ..Default::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn completed_render_ends_the_body_cleanly() {
        let generator = generator(3);
        let body = spawn_render(Buffering::default(), move |out| {
            generator.write_gif(1.0, out, &CancelToken::new()).map(drop)
        });
        let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
        assert_eq!(&bytes[..6], b"GIF89a");
        assert_eq!(bytes.last(), Some(&0x3b));
    }

    #[tokio::test]
    async fn panicking_render_aborts_the_body() {
        let generator = generator(6);
        let body = spawn_render(Buffering::default(), move |out| {
            let mut sink = Counting {
                inner: GifSink::new(out),
                pushed: Arc::default(),
                panic_at: Some(2),
            };
            generator.run(1.0, &mut sink, &CancelToken::new()).map(drop)
        });
        assert!(axum::body::to_bytes(body, usize::MAX).await.is_err());
    }

    #[tokio::test]
    async fn dropping_the_body_stops_rendering() {
        let generator = generator(64);
        let pushed = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&pushed);
        let (done_tx, done_rx) = oneshot::channel();
        let buffering = Buffering {
            channel_capacity: 1,
            chunk_size: 64,
        };
        let body = spawn_render(buffering, move |out| {
            let mut sink = Counting {
                inner: GifSink::new(out),
                pushed: counter,
                panic_at: None,
            };
            let result = generator.run(1.0, &mut sink, &CancelToken::new()).map(drop);
            let _ = done_tx.send(result.as_ref().err().map(LissajousError::is_sink_failure));
            result
        });

        let mut stream = body.into_data_stream();
        let first = stream.next().await.unwrap().unwrap();
        assert!(first.starts_with(b"GIF89a"));
        drop(stream);

        let outcome = tokio::time::timeout(Duration::from_secs(10), done_rx)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(outcome, Some(true));
        assert!(pushed.load(Ordering::SeqCst) < 64);
    }
}
