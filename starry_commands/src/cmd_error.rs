use serenity::{
    builder::{CreateEmbed, CreateMessage},
    client::Context,
    framework::standard::{macros::hook, DispatchError, Reason},
    model::prelude::Message,
};
use starry_macros::handle_serenity_error;

const ERROR_COLOUR: u32 = 0xB00020;
const SUCCESS_COLOUR: u32 = 0xFDD835;

/// Sends `embed` as a reply in the channel `msg` was sent in.
pub async fn send_embed(ctx: &Context, msg: &Message, is_error: bool, embed: CreateEmbed) {
    let embed = embed.colour(if is_error { ERROR_COLOUR } else { SUCCESS_COLOUR });
    if let Err(e) = msg
        .channel_id
        .send_message(ctx, CreateMessage::new().embed(embed).reference_message(msg))
        .await
    {
        handle_serenity_error!(e);
    }
}

/// What to tell the user when a command couldn't be dispatched. `None` means stay quiet.
pub fn describe_dispatch_error(error: &DispatchError) -> Option<String> {
    Some(match error {
        DispatchError::Ratelimited(info) if !info.is_first_try => return None,
        DispatchError::Ratelimited(info) => format!(
            "Calm down and try again in {} seconds please",
            info.rate_limit.as_secs()
        ),
        DispatchError::CheckFailed(check, Reason::User(reason)) => {
            format!("Seems like you don't pass the check.. {}\n{}", reason, check)
        }
        DispatchError::CheckFailed(check, _) => {
            format!("Seems like you don't pass the check.. {}", check)
        }
        DispatchError::CommandDisabled => "This command is disabled right now.".to_string(),
        DispatchError::LackingPermissions(perms) => format!(
            "**You need these permissions to run this command and you don't have them** 😤\n{}",
            perms.get_permission_names().join("\n")
        ),
        DispatchError::NotEnoughArguments { min, given } => format!(
            "This command needs {} arguments after it but you only gave {}..",
            min, given
        ),
        DispatchError::TooManyArguments { max, given } => format!(
            "This command can't take more than {} arguments but you gave {}..",
            max, given
        ),
        DispatchError::OnlyForDM => "You can only use this command in my DMs.".to_string(),
        DispatchError::OnlyForGuilds => "You can only use this command in a server.".to_string(),
        DispatchError::OnlyForOwners => {
            "This command is dedicated to my owners, no ordinary user can use it.".to_string()
        }
        DispatchError::LackingRole => {
            "You don't have the roles required for this command..".to_string()
        }
        _ => "You discovered a very mysterious error".to_string(),
    })
}

/// Informs the user why their command didn't run, unless they're being rate limited again.
#[hook]
pub async fn handle(ctx: &Context, msg: &Message, error: DispatchError, command_name: &str) {
    tracing::debug!("couldn't dispatch `{}`: {:?}", command_name, error);
    if let Some(description) = describe_dispatch_error(&error) {
        send_embed(ctx, msg, true, CreateEmbed::new().description(description)).await;
    }
}

/// Runs when a bucket is exhausted. Reacts to the message instead of replying.
#[hook]
pub async fn delay_action(ctx: &Context, msg: &Message) {
    if let Err(err) = msg.react(ctx, '😤').await {
        let embed = CreateEmbed::new()
            .title("I was going to react with 😤 to show my frustration of you being so impatient, but I couldn't so I'm even more frustrated now 😤")
            .description(err.to_string());
        send_embed(ctx, msg, true, embed).await
    };
}
