use mysql_backup::{
    args::{Cli, Options},
    utils::exit_on_error,
};
use tracing_subscriber::EnvFilter;

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("mysql_backup={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse_lenient(std::env::args_os());
    init_tracing(&cli.log_level);

    let ask_pass = cli.ask_pass;
    let cwd = exit_on_error(std::env::current_dir());
    let mut opts = exit_on_error(Options::from_cli(cli, cwd));
    if ask_pass {
        opts.connect.password = exit_on_error(rpassword::prompt_password("Password: "));
    }

    exit_on_error(mysql_backup::backup(&opts));
}
