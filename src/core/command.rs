//! Command registry and canned responses.
//!
//! Dispatch is total: every input line, after trimming and case-folding,
//! maps to exactly one reply, either a recognized command's output or the
//! fixed fallback. Handlers never fail and never block; the "network" and
//! "wallet" figures are synthetic, drawn from a caller-supplied RNG within
//! the documented bounds below.

use rand::rngs::StdRng;
use rand::Rng;

/// Reply for any input that matches no registry entry.
pub const FALLBACK: &str = "Command not recognized. Type 'help' for available commands.";

/// Synthetic network figures, bounds documented where they are drawn.
const TPS_RANGE: (u32, u32) = (2_000, 3_000);
const VALIDATOR_RANGE: (u32, u32) = (1_800, 1_950);
const NET_LATENCY_MS: (f32, f32) = (0.1, 0.9);
const EPOCH_APY: (f32, f32) = (4.0, 6.0);
const STAKE_APY: (f32, f32) = (4.5, 5.5);
const NODE_RANGE: (u32, u32) = (2_000, 3_000);
const NODE_LATENCY_MS: (f32, f32) = (0.05, 0.25);

/// The closed set of recognized commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Help,
    Solana,
    Balance,
    Nft,
    Stake,
    Matrix,
    Hack,
    Validate,
    Nodes,
    Clear,
    Exit,
}

impl Command {
    /// Normalize raw input (trim + ASCII case-fold) and look it up.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "help" => Some(Self::Help),
            "solana" => Some(Self::Solana),
            "balance" => Some(Self::Balance),
            "nft" => Some(Self::Nft),
            "stake" => Some(Self::Stake),
            "matrix" => Some(Self::Matrix),
            "hack" => Some(Self::Hack),
            "validate" => Some(Self::Validate),
            "nodes" => Some(Self::Nodes),
            "clear" => Some(Self::Clear),
            "exit" => Some(Self::Exit),
            _ => None,
        }
    }
}

/// What a command asks its host to do besides printing its text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Pure text, no state change outside the scrollback append.
    None,
    /// Reset scrollback to the initial prompt and empty the history.
    ClearScreen,
    /// Signal the shell to hide the terminal panel.
    CloseTerminal,
    /// Switch the active backdrop variant.
    SwitchBackdrop,
}

/// The outcome of dispatching one input line.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub text: String,
    pub effect: Effect,
}

impl Reply {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            effect: Effect::None,
        }
    }

    fn with_effect(effect: Effect, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            effect,
        }
    }
}

/// Dispatch a raw input line. Unknown input yields the fallback reply and
/// no effect; this function has no failure path.
pub fn dispatch(raw: &str, rng: &mut StdRng) -> Reply {
    let Some(command) = Command::parse(raw) else {
        return Reply::text(FALLBACK);
    };

    match command {
        Command::Help => Reply::text(
            "Available commands:\n\
             \x20 • solana   - Show Solana network status\n\
             \x20 • balance  - Display your wallet balance\n\
             \x20 • nft      - Fetch a Matrix-themed NFT\n\
             \x20 • stake    - Stake your SOL (mock)\n\
             \x20 • matrix   - Switch the backdrop effect\n\
             \x20 • hack     - \"Hack\" the Solana network (mock)\n\
             \x20 • validate - Check Solana validator status\n\
             \x20 • nodes    - Show active Solana nodes\n\
             \x20 • clear    - Clear terminal\n\
             \x20 • exit     - Close terminal",
        ),
        Command::Solana => network_status(rng),
        Command::Balance => Reply::text(
            "Your Wallet Balance:\n\
             \x20 • 25.3 SOL\n\
             \x20 • 4,320 Matrix Tokens",
        ),
        Command::Nft => Reply::text(
            "Matrix-Themed NFT:\n\
             \x20 \"Neo's Code Rain\" - An AI-crafted NFT showcasing endless streams\n\
             \x20 of Matrix green code dripping into the Solana network.",
        ),
        Command::Stake => stake_receipt(rng),
        Command::Matrix => Reply::with_effect(
            Effect::SwitchBackdrop,
            "Switching backdrop effect...",
        ),
        Command::Hack => Reply::text(
            "Accessing Solana Core...\n\
             \x20 Just kidding! You can't hack the blockchain ;)",
        ),
        Command::Validate => validator_status(rng),
        Command::Nodes => node_census(rng),
        Command::Clear => Reply::with_effect(Effect::ClearScreen, ""),
        Command::Exit => Reply::with_effect(Effect::CloseTerminal, ""),
    }
}

fn network_status(rng: &mut StdRng) -> Reply {
    Reply::text(format!(
        "Solana Network Status:\n\
         \x20 • TPS: {}\n\
         \x20 • Validators: {}\n\
         \x20 • Network Latency: {:.1}ms\n\
         \x20 • Last Epoch Rewards: {:.1}% APY",
        group_thousands(rng.gen_range(TPS_RANGE.0..=TPS_RANGE.1)),
        group_thousands(rng.gen_range(VALIDATOR_RANGE.0..=VALIDATOR_RANGE.1)),
        rng.gen_range(NET_LATENCY_MS.0..NET_LATENCY_MS.1),
        rng.gen_range(EPOCH_APY.0..EPOCH_APY.1),
    ))
}

fn stake_receipt(rng: &mut StdRng) -> Reply {
    Reply::text(format!(
        "Staking Initialized:\n\
         \x20 • Delegating 10 SOL to Validator X\n\
         \x20 • Expected Rewards: {:.1}% APY",
        rng.gen_range(STAKE_APY.0..STAKE_APY.1),
    ))
}

fn validator_status(rng: &mut StdRng) -> Reply {
    Reply::text(format!(
        "Solana Validators:\n\
         \x20 • Active Validators: {}\n\
         \x20 • Stake Distributed: 65.3%\n\
         \x20 • Top Validator: Validator-42",
        group_thousands(rng.gen_range(VALIDATOR_RANGE.0..=VALIDATOR_RANGE.1)),
    ))
}

fn node_census(rng: &mut StdRng) -> Reply {
    Reply::text(format!(
        "Active Solana Nodes:\n\
         \x20 • {} nodes active globally\n\
         \x20 • Node Latency: Avg {:.2}ms",
        group_thousands(rng.gen_range(NODE_RANGE.0..=NODE_RANGE.1)),
        rng.gen_range(NODE_LATENCY_MS.0..NODE_LATENCY_MS.1),
    ))
}

/// Insert thousands separators: 1875 -> "1,875".
fn group_thousands(n: u32) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(99)
    }

    #[test]
    fn parse_rejects_partial_matches() {
        assert_eq!(Command::parse("helpme"), None);
        assert_eq!(Command::parse("sol"), None);
    }

    #[test]
    fn normalization_trims_and_case_folds() {
        assert_eq!(Command::parse("help"), Some(Command::Help));
        assert_eq!(Command::parse("  HELP  "), Some(Command::Help));
        assert_eq!(Command::parse("\tClEaR\n"), Some(Command::Clear));
        assert_eq!(Command::parse("frobnicate"), None);
        assert_eq!(Command::parse(""), None);
    }

    #[test]
    fn unknown_input_yields_exact_fallback() {
        let reply = dispatch("frobnicate", &mut rng());
        assert_eq!(reply.text, FALLBACK);
        assert_eq!(reply.effect, Effect::None);
    }

    #[test]
    fn dispatch_is_total() {
        let inputs = ["help", "SOLANA", " balance ", "???", "rm -rf /", "exit"];
        for input in inputs {
            let reply = dispatch(input, &mut rng());
            assert!(!reply.text.is_empty() || reply.effect != Effect::None);
        }
    }

    #[test]
    fn mixed_case_matches_lowercase() {
        let a = dispatch("HELP  ", &mut rng());
        let b = dispatch("help", &mut rng());
        assert_eq!(a, b);
    }

    #[test]
    fn side_effect_commands() {
        let clear = dispatch("clear", &mut rng());
        assert_eq!(clear.effect, Effect::ClearScreen);
        assert!(clear.text.is_empty());

        let exit = dispatch("exit", &mut rng());
        assert_eq!(exit.effect, Effect::CloseTerminal);
        assert!(exit.text.is_empty());

        let matrix = dispatch("matrix", &mut rng());
        assert_eq!(matrix.effect, Effect::SwitchBackdrop);
        assert!(!matrix.text.is_empty());
    }

    #[test]
    fn help_lists_every_command() {
        let help = dispatch("help", &mut rng()).text;
        for name in [
            "solana", "balance", "nft", "stake", "matrix", "hack", "validate", "nodes", "clear",
            "exit",
        ] {
            assert!(help.contains(name), "help is missing '{}'", name);
        }
    }

    #[test]
    fn randomized_replies_keep_their_shape() {
        let mut r = rng();
        for _ in 0..100 {
            let status = dispatch("solana", &mut r).text;
            let lines: Vec<&str> = status.lines().collect();
            assert_eq!(lines.len(), 5);
            assert!(lines[0].starts_with("Solana Network Status:"));
            assert!(lines[1].contains("TPS:"));
            assert!(lines[3].contains("ms"));
        }
    }

    #[test]
    fn randomized_figures_stay_in_bounds() {
        let mut r = rng();
        for _ in 0..1_000 {
            let tps = r.gen_range(TPS_RANGE.0..=TPS_RANGE.1);
            assert!((TPS_RANGE.0..=TPS_RANGE.1).contains(&tps));
            let lat = r.gen_range(NET_LATENCY_MS.0..NET_LATENCY_MS.1);
            assert!(lat >= NET_LATENCY_MS.0 && lat < NET_LATENCY_MS.1);
        }
    }

    #[test]
    fn thousands_grouping() {
        assert_eq!(group_thousands(5), "5");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1_875), "1,875");
        assert_eq!(group_thousands(2_431_009), "2,431,009");
    }
}
