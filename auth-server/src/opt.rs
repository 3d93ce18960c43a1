use clap::Parser;
use clio::Input;

#[derive(Debug, Parser)]
#[command(name = "demo-auth", about = "Demo authentication service")]
pub struct Opt {
    /// Config file path, `-` for stdin
    #[arg(short, long, value_parser, default_value = "config.toml")]
    pub config: Input,
}
