use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "sb", about = concat!("stackboard v", env!("CARGO_PKG_VERSION"), " - sticky stacked columns for markdown boards"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Board file to operate on
    #[arg(short = 'b', long = "board", global = true, default_value = "board.md")]
    pub board: String,

    /// Config file (default: stackboard.toml beside the board)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Column measurements as JSON (default: estimated from the board)
    #[arg(long, global = true)]
    pub measurements: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List stacks and their columns
    Stacks,
    /// Compute and print sticky positions
    Layout(LayoutArgs),
    /// Fold or unfold a column
    Fold(FoldArgs),
    /// Fold every column, or unfold all if all are folded
    FoldAll,
    /// Fold or unfold every task in a column
    FoldTasks(ColumnArg),
    /// Fold or unfold a single task
    FoldTask(FoldTaskArgs),
    /// Add or remove a column's #stack tag
    Stack(StackArgs),
    /// Show which sticky columns anchor to the top at a scroll position
    Scroll(ScrollArgs),
    /// Show or set the sticky mode
    Mode(ModeArgs),
    /// Show or reset saved fold state
    State(StateCmd),
}

// ---------------------------------------------------------------------------
// Layout args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct LayoutArgs {
    /// Only lay out this stack (its first column's id)
    #[arg(long)]
    pub stack: Option<String>,
}

#[derive(Args)]
pub struct ScrollArgs {
    /// Vertical scroll position of the board
    #[arg(allow_negative_numbers = true)]
    pub offset: f64,
}

#[derive(Args)]
pub struct ModeArgs {
    /// New mode (none, titleonly, full); prints the current mode if omitted
    pub mode: Option<String>,
}

// ---------------------------------------------------------------------------
// Fold args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ColumnArg {
    /// Column id
    pub column: String,
}

#[derive(Args)]
pub struct FoldArgs {
    /// Column id
    pub column: String,
    /// Fold a lone column the other way
    #[arg(long)]
    pub alt: bool,
}

#[derive(Args)]
pub struct FoldTaskArgs {
    /// Column id
    pub column: String,
    /// Task id (column/index)
    pub task: String,
}

// ---------------------------------------------------------------------------
// Stack args
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

#[derive(Args)]
pub struct StackArgs {
    /// Column id
    pub column: String,
    /// Join the previous stack (on) or start a new one (off)
    pub state: Toggle,
}

// ---------------------------------------------------------------------------
// State args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct StateCmd {
    #[command(subcommand)]
    pub action: StateAction,
}

#[derive(Subcommand)]
pub enum StateAction {
    /// Print the saved state file
    Show,
    /// Delete the saved state file
    Reset,
}
