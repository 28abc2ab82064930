use crate::{config::Configuration, constant, picker, scheduler};
use anyhow::Context as AnyhowContext;
use serenity::{
    async_trait,
    builder::{CreateAttachment, CreateMessage},
    http::Http,
    model::prelude::ChannelId,
};
use std::{io::SeekFrom, sync::Arc, time::Duration};
use tokio::{
    io::{AsyncRead, AsyncReadExt, AsyncSeek, AsyncSeekExt},
    signal::unix::{SignalKind, signal},
};
use tracing::{error, info};

/// Everything the posting loop reacts to. Inbound slash commands are not an
/// event here: serenity dispatches those to the handler on its own task.
enum Event {
    Boundary,
    Shutdown,
}

/// Waits for whichever comes first of a termination signal or the next
/// interval boundary, and runs one post cycle per boundary. Returns on
/// SIGINT/SIGTERM; every per-cycle failure is logged and swallowed.
pub async fn run(http: Arc<Http>, config: Configuration, interval: Duration) -> anyhow::Result<()> {
    let mut sigterm = signal(SignalKind::terminate()).context("failed to install signal handler")?;

    loop {
        let event = tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result.context("failed to listen for interrupt")?;
                Event::Shutdown
            }
            _ = sigterm.recv() => Event::Shutdown,
            _ = tokio::time::sleep(scheduler::until_next_boundary(interval)) => Event::Boundary,
        };

        match event {
            Event::Shutdown => {
                info!("signal received, shutting down");
                return Ok(());
            }
            Event::Boundary => post_cycle(&http, &config).await,
        }
    }
}

/// One posting cycle: pick an image and send it to every configured channel.
async fn post_cycle(http: &Http, config: &Configuration) {
    let picked = match picker::random_image(&config.posting.image_dirs).await {
        Ok(picked) => picked,
        Err(err) => {
            error!("getting random image: {err:#}");
            return;
        }
    };
    let content = caption(&config.posting.content, &picked.filename);

    let destinations: Vec<_> = config
        .posting
        .channels
        .iter()
        .map(|&channel| ChannelDestination { http, channel })
        .collect();

    let picker::PickedImage { filename, mut file } = picked;
    deliver(&mut file, &filename, content.as_deref(), &destinations).await;
}

/// Somewhere a picked image can be sent to.
#[async_trait]
trait Destination {
    async fn send(&self, filename: &str, data: Vec<u8>, content: Option<&str>)
    -> anyhow::Result<()>;
}

struct ChannelDestination<'a> {
    http: &'a Http,
    channel: ChannelId,
}
#[async_trait]
impl Destination for ChannelDestination<'_> {
    async fn send(
        &self,
        filename: &str,
        data: Vec<u8>,
        content: Option<&str>,
    ) -> anyhow::Result<()> {
        let mut message = CreateMessage::new().add_file(CreateAttachment::bytes(data, filename));
        if let Some(content) = content {
            message = message.content(content);
        }
        self.channel
            .send_message(self.http, message)
            .await
            .with_context(|| format!("sending message to {}", self.channel))?;
        Ok(())
    }
}

/// Sends the stream's contents to each destination in turn, rewinding it to
/// the start between sends. A failed send skips to the next destination; a
/// failed rewind or re-read abandons the remaining destinations for this
/// cycle. The stream is released by the caller dropping it.
async fn deliver<S, D>(stream: &mut S, filename: &str, content: Option<&str>, destinations: &[D])
where
    S: AsyncRead + AsyncSeek + Unpin + Send,
    D: Destination + Sync,
{
    for (i, destination) in destinations.iter().enumerate() {
        // Sending reads the stream to its end, so rewind before every send
        // after the first.
        if i > 0 {
            if let Err(err) = stream.seek(SeekFrom::Start(0)).await {
                error!("seeking image: {err}");
                return;
            }
        }

        let mut data = vec![];
        if let Err(err) = stream.read_to_end(&mut data).await {
            error!("reading image: {err}");
            return;
        }

        if let Err(err) = destination.send(filename, data, content).await {
            error!("sending message: {err:#}");
        }
    }
}

/// Resolves the caption template against the picked filename. An empty
/// template means no caption text at all.
fn caption(template: &str, filename: &str) -> Option<String> {
    if template.is_empty() {
        return None;
    }
    Some(template.replace(constant::FILENAME_PLACEHOLDER, filename))
}
