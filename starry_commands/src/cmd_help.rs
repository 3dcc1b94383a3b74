use starry_macros::handle_serenity_error;
use std::collections::HashSet;

use serenity::{
    client::Context,
    framework::standard::{
        help_commands, macros::help, Args, CommandGroup, CommandResult, HelpOptions,
    },
    model::{channel::Message, id::UserId},
};

#[help("help", "commands", "cmds")]
#[suggestion_text = "**Maybe you meant one of these:**\n{}"]
#[max_levenshtein_distance(3)]
#[no_help_available_text = "I don't know this command :("]
#[usage_label = "You use it like"]
#[usage_sample_label = "For example"]
#[aliases_label = "You can also use"]
#[grouped_label = "It's in"]
#[individual_command_tip = "Want me to explain a command? Type `help [command name]`"]
#[strikethrough_commands_tip_in_dm = ""]
#[strikethrough_commands_tip_in_guild = ""]
#[lacking_permissions = "Hide"]
#[lacking_ownership = "Hide"]
#[embed_error_colour = "#b00020"]
#[embed_success_colour = "#fdd835"]
async fn cmd_help(
    context: &Context,
    msg: &Message,
    args: Args,
    help_options: &'static HelpOptions,
    groups: &[&'static CommandGroup],
    owners: HashSet<UserId>,
) -> CommandResult {
    if let Err(e) =
        help_commands::with_embeds(context, msg, args, help_options, groups, owners).await
    {
        handle_serenity_error!(e);
    }
    Ok(())
}
