use std::io;
use std::io::IsTerminal;

use clap::{CommandFactory, FromArgMatches};
use clap_complete::generate;
use cli_table::ColorChoice;

use horizon::client::commands::available::command_available;
use horizon::client::commands::classes::command_classes;
use horizon::client::globalsettings::GlobalSettings;
use horizon::client::output::cli::CliOutput;
use horizon::client::output::json::JsonOutput;
use horizon::client::output::outputs::{Output, Outputs};
use horizon::client::output::quiet::Quiet;
use horizon::common::cli::{
    ColorPolicy, CommonOpts, GenerateCompletionOpts, RootOptions, SubCommand,
};
use horizon::common::config::HorizonConfig;
use horizon::common::setup::setup_logging;

fn make_printer(opts: &CommonOpts) -> Box<dyn Output> {
    let color_policy = match opts.colors {
        ColorPolicy::Always => ColorChoice::AlwaysAnsi,
        ColorPolicy::Auto => {
            if io::stdout().is_terminal() {
                ColorChoice::Auto
            } else {
                ColorChoice::Never
            }
        }
        ColorPolicy::Never => ColorChoice::Never,
    };

    match opts.output_mode {
        Outputs::Cli => {
            match color_policy {
                ColorChoice::Always | ColorChoice::AlwaysAnsi => {
                    colored::control::set_override(true)
                }
                ColorChoice::Never => colored::control::set_override(false),
                _ => {}
            }

            Box::new(CliOutput::new(color_policy))
        }
        Outputs::Json => Box::<JsonOutput>::default(),
        Outputs::Quiet => Box::<Quiet>::default(),
    }
}

fn generate_completion(opts: GenerateCompletionOpts) -> anyhow::Result<()> {
    let generator = opts.shell;

    let mut app = RootOptions::command();
    eprintln!("Generating completion file for {generator}...");
    generate(generator, &mut app, "horizon".to_string(), &mut io::stdout());
    Ok(())
}

fn main() -> horizon::Result<()> {
    let matches = RootOptions::command().get_matches();
    let top_opts = match RootOptions::from_arg_matches(&matches) {
        Ok(opts) => opts,
        Err(error) => error.exit(),
    };

    setup_logging(top_opts.common.debug);

    let printer = make_printer(&top_opts.common);
    let config = match HorizonConfig::load(top_opts.common.config.as_deref()) {
        Ok(config) => config,
        Err(error) => {
            printer.print_error(anyhow::Error::new(error).context("Cannot load configuration"));
            std::process::exit(1);
        }
    };
    let gsettings = GlobalSettings::new(config, printer);

    let result = match top_opts.subcmd {
        SubCommand::Available(opts) => command_available(&gsettings, opts),
        SubCommand::Classes(opts) => command_classes(&gsettings, opts),
        SubCommand::GenerateCompletion(opts) => generate_completion(opts),
    };

    if let Err(e) = result {
        gsettings.printer().print_error(e);
        std::process::exit(1);
    }

    Ok(())
}
