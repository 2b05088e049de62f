use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Idempotent Docker provisioning and project scaffolding
#[derive(Parser, Debug)]
#[command(
    name = "dockstrap",
    about = "Idempotent Docker provisioning and project scaffolding",
    version,
    long_about = "dockstrap installs Docker and Docker Compose when they are missing, clones a \
                  project and scaffolds a Dockerfile and docker-compose.yml for it. Supported \
                  stacks: node, django, flask."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,

    #[arg(
        short = 'C',
        long = "dir",
        global = true,
        value_name = "DIR",
        help = "Working directory (defaults to the current directory)"
    )]
    pub work_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Interactive setup",
        long_about = "Asks whether to install Docker and Docker Compose, then optionally clones a \
                      repository and scaffolds it.\n\n\
                      Examples:\n  \
                      dockstrap setup\n  \
                      sudo -E dockstrap setup -C ~/projects"
    )]
    Setup,

    #[command(
        about = "Install and verify Docker and Docker Compose",
        long_about = "Installs Docker and Docker Compose when they are not on the search path and \
                      verifies them. Already installed tools are left untouched.\n\n\
                      Examples:\n  \
                      dockstrap install\n  \
                      dockstrap install --dry-run --format yaml"
    )]
    Install(InstallArgs),

    #[command(
        about = "Clone a repository and scaffold it non-interactively",
        long_about = "Clones the repository into the working directory, writes a Dockerfile for \
                      the chosen stack, builds the image and writes docker-compose.yml.\n\n\
                      Examples:\n  \
                      dockstrap scaffold --repo https://github.com/acme/shop.git --stack node\n  \
                      dockstrap scaffold --repo git@github.com:acme/api.git --stack django --port 8080"
    )]
    Scaffold(ScaffoldArgs),

    #[command(
        about = "Write a Dockerfile for a stack",
        long_about = "Renders the Dockerfile template for a stack into an existing project \
                      directory without cloning or building.\n\n\
                      Examples:\n  \
                      dockstrap dockerfile --stack flask\n  \
                      dockstrap dockerfile --stack node --runtime-version 18 ./web"
    )]
    Dockerfile(DockerfileArgs),

    #[command(
        about = "Write docker-compose.yml from an existing Dockerfile",
        long_about = "Synthesizes a single-service compose manifest. The published port is read \
                      from the Dockerfile's EXPOSE line unless --port is given.\n\n\
                      Examples:\n  \
                      dockstrap compose\n  \
                      dockstrap compose --service web --port 8080 ./web"
    )]
    Compose(ComposeArgs),

    #[command(about = "Show the platform and which tools are installed")]
    Detect(FormatArgs),

    #[command(about = "Show effective configuration")]
    Config(FormatArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct InstallArgs {
    #[arg(long, help = "Print the install steps without running them")]
    pub dry_run: bool,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(Parser, Debug, Clone)]
pub struct ScaffoldArgs {
    #[arg(long, value_name = "URL", help = "Git repository to clone")]
    pub repo: String,

    #[arg(long, value_name = "STACK", help = "Project type: node, django or flask")]
    pub stack: String,

    #[command(flatten)]
    pub template: TemplateArgs,

    #[arg(long, value_name = "NAME", help = "Docker image name (default: my-app)")]
    pub image: Option<String>,

    #[arg(long, value_name = "NAME", help = "Compose service name (default: app)")]
    pub service: Option<String>,

    #[arg(
        long,
        value_name = "PORT",
        help = "Published port (default: the Dockerfile's exposed port)"
    )]
    pub compose_port: Option<String>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(Parser, Debug, Clone)]
pub struct TemplateArgs {
    #[arg(
        long,
        value_name = "VERSION",
        help = "Base image tag, e.g. 18 or 3.11 (default: latest)"
    )]
    pub runtime_version: Option<String>,

    #[arg(long, value_name = "PORT", help = "Application port (default per stack)")]
    pub port: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct DockerfileArgs {
    #[arg(long, value_name = "STACK", help = "Project type: node, django or flask")]
    pub stack: String,

    #[command(flatten)]
    pub template: TemplateArgs,

    #[arg(long, help = "Print the Dockerfile instead of writing it")]
    pub stdout: bool,

    #[arg(
        value_name = "PATH",
        help = "Project directory (defaults to the working directory)"
    )]
    pub path: Option<PathBuf>,
}

#[derive(Parser, Debug, Clone)]
pub struct ComposeArgs {
    #[arg(long, value_name = "NAME", help = "Compose service name (default: app)")]
    pub service: Option<String>,

    #[arg(long, value_name = "PORT", help = "Port to publish")]
    pub port: Option<String>,

    #[arg(long, help = "Print the manifest instead of writing it")]
    pub stdout: bool,

    #[arg(
        value_name = "PATH",
        help = "Project directory (defaults to the working directory)"
    )]
    pub path: Option<PathBuf>,
}

#[derive(Parser, Debug, Clone)]
pub struct FormatArgs {
    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Yaml,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Yaml => super::output::OutputFormat::Yaml,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}
