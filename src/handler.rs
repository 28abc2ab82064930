use crate::{config::Configuration, picker};
use serenity::{
    all::{ActivityData, CommandId, Interaction, Ready},
    async_trait,
    builder::{
        CreateAttachment, CreateCommand, CreateInteractionResponse,
        CreateInteractionResponseMessage,
    },
    client::{Context, EventHandler},
    http::Http,
    model::application::Command,
};
use std::{path::PathBuf, sync::OnceLock};
use tracing::{error, info};

pub struct Handler {
    config: Configuration,
    /// Id of the slash command registered on ready; interactions for any
    /// other command are ignored.
    command_id: OnceLock<CommandId>,
}
impl Handler {
    pub fn new(config: Configuration) -> Self {
        Self {
            config,
            command_id: OnceLock::new(),
        }
    }

    fn is_registered_command(&self, id: CommandId) -> bool {
        self.command_id.get() == Some(&id)
    }
}
#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("{} is connected; registering command", ready.user.name);

        match ready_handler(&ctx.http, &self.config).await {
            Ok(command_id) => {
                self.command_id.set(command_id).ok();
            }
            Err(err) => {
                error!("registering command: {err:#}");
                std::process::exit(1);
            }
        }

        ctx.set_activity(Some(ActivityData::playing(&self.config.discord.activity)));
        info!("{} is good to go", ready.user.name);
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        let Interaction::Command(cmd) = interaction else {
            return;
        };
        if !self.is_registered_command(cmd.data.id) {
            return;
        }

        let response = response_for(image_response(&self.config.posting.image_dirs).await);
        if let Err(err) = cmd.create_response(&ctx.http, response).await {
            error!("responding to interaction: {err}");
        }
    }
}

async fn ready_handler(http: &Http, config: &Configuration) -> anyhow::Result<CommandId> {
    let command = Command::create_global_command(
        http,
        CreateCommand::new(&config.command.name).description(&config.command.description),
    )
    .await?;

    Ok(command.id)
}

/// Picks a fresh image and builds a response message with it attached. The
/// file handle is released when the picked image goes out of scope.
async fn image_response(dirs: &[PathBuf]) -> anyhow::Result<CreateInteractionResponseMessage> {
    let picked = picker::random_image(dirs).await?;
    let attachment = CreateAttachment::file(&picked.file, &picked.filename).await?;

    Ok(CreateInteractionResponseMessage::new().add_file(attachment))
}

/// The picked image on success; an ephemeral message carrying the error text
/// on failure. Either way the interaction gets exactly one response.
fn response_for(
    result: anyhow::Result<CreateInteractionResponseMessage>,
) -> CreateInteractionResponse {
    CreateInteractionResponse::Message(match result {
        Ok(message) => message,
        Err(err) => CreateInteractionResponseMessage::new()
            .content(err.to_string())
            .ephemeral(true),
    })
}
