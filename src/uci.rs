//! DuelChess - UCI Front-end
//!
//! A thin UCI adapter over [`Game`] and [`SearchEngine`]. It parses commands,
//! forwards them to the core and prints replies; no chess logic lives here.

use std::io::{self, BufRead, Write};

use log::{info, warn};

use crate::config::{EngineConfig, Strategy, MAX_SEARCH_DEPTH};
use crate::evaluation::{is_mate_score, MATE_SCORE};
use crate::game::Game;
use crate::search::{SearchEngine, SearchResult};

const ENGINE_NAME: &str = "DuelChess";
const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Option types advertised in reply to `uci`
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UciOptionKind {
    Spin { default: i64, min: i64, max: i64 },
    Check { default: bool },
    Combo { default: &'static str, vars: &'static [&'static str] },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UciOption {
    pub name: &'static str,
    pub kind: UciOptionKind,
}

impl UciOption {
    pub fn to_uci_string(&self) -> String {
        let mut s = format!("option name {} type ", self.name);
        match &self.kind {
            UciOptionKind::Spin { default, min, max } => {
                s.push_str(&format!("spin default {} min {} max {}", default, min, max));
            }
            UciOptionKind::Check { default } => {
                s.push_str(&format!("check default {}", default));
            }
            UciOptionKind::Combo { default, vars } => {
                s.push_str(&format!("combo default {}", default));
                for var in vars.iter() {
                    s.push_str(&format!(" var {}", var));
                }
            }
        }
        s
    }
}

fn engine_options(config: &EngineConfig) -> Vec<UciOption> {
    vec![
        UciOption {
            name: "Depth",
            kind: UciOptionKind::Spin {
                default: config.depth as i64,
                min: 1,
                max: MAX_SEARCH_DEPTH as i64,
            },
        },
        UciOption {
            name: "Strategy",
            kind: UciOptionKind::Combo {
                default: match config.strategy {
                    Strategy::Search => "search",
                    Strategy::Random => "random",
                },
                vars: &["search", "random"],
            },
        },
        // 0 draws a fresh seed from the OS
        UciOption {
            name: "Seed",
            kind: UciOptionKind::Spin {
                default: config.seed.unwrap_or(0) as i64,
                min: 0,
                max: i64::MAX,
            },
        },
        UciOption {
            name: "Pruning",
            kind: UciOptionKind::Check {
                default: config.pruning,
            },
        },
    ]
}

/// Format a search score for an `info` line. `depth` is the search depth the
/// score was produced with.
pub fn format_score(score: i32, depth: u32) -> String {
    if is_mate_score(score) {
        let remaining = score.abs() - MATE_SCORE;
        let plies = (depth as i32 - remaining).max(1);
        let moves = (plies + 1) / 2;
        if score > 0 {
            format!("mate {}", moves)
        } else {
            format!("mate -{}", moves)
        }
    } else {
        format!("cp {}", score)
    }
}

/// UCI protocol handler writing replies to `out`
pub struct UCIProtocol<W: Write> {
    game: Game,
    engine: SearchEngine,
    out: W,
    running: bool,
    debug_mode: bool,
}

impl UCIProtocol<io::Stdout> {
    pub fn new(config: EngineConfig) -> Self {
        UCIProtocol::with_output(config, io::stdout())
    }
}

impl<W: Write> UCIProtocol<W> {
    pub fn with_output(config: EngineConfig, out: W) -> Self {
        UCIProtocol {
            game: Game::new(),
            engine: SearchEngine::new(config),
            out,
            running: true,
            debug_mode: false,
        }
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn engine(&self) -> &SearchEngine {
        &self.engine
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Read commands line by line until `quit` or end of input
    pub fn run<R: BufRead>(&mut self, input: R) -> io::Result<()> {
        for line in input.lines() {
            let line = line?;
            let line = line.trim();
            if !line.is_empty() {
                self.process_command(line)?;
            }
            if !self.running {
                break;
            }
        }
        Ok(())
    }

    pub fn process_command(&mut self, line: &str) -> io::Result<()> {
        let parts: Vec<&str> = line.split_whitespace().collect();
        let Some((&command, args)) = parts.split_first() else {
            return Ok(());
        };

        match command {
            "uci" => self.cmd_uci(),
            "isready" => self.send("readyok"),
            "setoption" => self.cmd_setoption(args),
            "ucinewgame" => {
                self.game.reset();
                Ok(())
            }
            "position" => self.cmd_position(args),
            "go" => self.cmd_go(args),
            // Searches run to completion before the next command is read
            "stop" => Ok(()),
            "quit" => {
                self.running = false;
                Ok(())
            }
            "debug" => {
                self.debug_mode = args.first() == Some(&"on");
                Ok(())
            }
            "d" => self.cmd_display(),
            "perft" => self.cmd_perft(args),
            _ => {
                warn!("unknown command: {}", command);
                if self.debug_mode {
                    self.send(&format!("info string Unknown command: {}", command))?;
                }
                Ok(())
            }
        }
    }

    fn send(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.out, "{}", message)?;
        self.out.flush()
    }

    fn cmd_uci(&mut self) -> io::Result<()> {
        self.send(&format!("id name {} {}", ENGINE_NAME, ENGINE_VERSION))?;
        self.send(&format!("id author {} developers", ENGINE_NAME))?;
        for option in engine_options(self.engine.config()) {
            self.send(&option.to_uci_string())?;
        }
        self.send("uciok")
    }

    fn cmd_setoption(&mut self, args: &[&str]) -> io::Result<()> {
        if args.first() != Some(&"name") {
            warn!("malformed setoption: {}", args.join(" "));
            return Ok(());
        }

        let rest = &args[1..];
        let (name_parts, value) = match rest.iter().position(|&a| a == "value") {
            Some(i) => (&rest[..i], rest[i + 1..].join(" ")),
            None => (rest, String::new()),
        };
        let name = name_parts.join(" ");

        let mut config = self.engine.config().clone();
        let parsed = match name.to_ascii_lowercase().as_str() {
            "depth" => value.parse::<u32>().ok().map(|d| config.depth = d),
            "strategy" => value.parse::<Strategy>().ok().map(|s| config.strategy = s),
            "seed" => value
                .parse::<u64>()
                .ok()
                .map(|s| config.seed = if s == 0 { None } else { Some(s) }),
            "pruning" => value.parse::<bool>().ok().map(|p| config.pruning = p),
            _ => None,
        };

        if parsed.is_none() {
            warn!("ignoring option '{}' with value '{}'", name, value);
            return Ok(());
        }
        match self.engine.set_config(config) {
            Ok(()) => {
                if self.debug_mode {
                    self.send(&format!("info string Option {} set to {}", name, value))?;
                }
            }
            Err(e) => warn!("{}", e),
        }
        Ok(())
    }

    fn cmd_position(&mut self, args: &[&str]) -> io::Result<()> {
        let moves_at = args.iter().position(|&a| a == "moves");
        let setup = &args[..moves_at.unwrap_or(args.len())];

        let game = match setup.split_first() {
            Some((&"startpos", _)) => Ok(Game::new()),
            Some((&"fen", fen)) => Game::from_fen(&fen.join(" ")),
            _ => {
                warn!("malformed position command: {}", args.join(" "));
                return Ok(());
            }
        };

        let mut game = match game {
            Ok(game) => game,
            Err(e) => {
                warn!("{}", e);
                return Ok(());
            }
        };

        if let Some(i) = moves_at {
            for text in &args[i + 1..] {
                if let Err(e) = game.play_text(text) {
                    warn!("{}", e);
                    break;
                }
            }
        }

        self.game = game;
        Ok(())
    }

    fn cmd_go(&mut self, args: &[&str]) -> io::Result<()> {
        let mut config = self.engine.config().clone();
        let mut i = 0;
        while i < args.len() {
            match args[i] {
                "depth" if i + 1 < args.len() => {
                    if let Ok(d) = args[i + 1].parse::<u32>() {
                        config.depth = d.clamp(1, MAX_SEARCH_DEPTH);
                    }
                    i += 2;
                }
                "movetime" if i + 1 < args.len() => {
                    config.move_time_ms = args[i + 1].parse::<u64>().ok().filter(|&ms| ms > 0);
                    i += 2;
                }
                "wtime" | "btime" | "winc" | "binc" | "movestogo" => i += 2,
                _ => i += 1,
            }
        }

        let saved = self.engine.config().clone();
        let result = self
            .engine
            .set_config(config)
            .and_then(|()| self.engine.choose_move(self.game.position(), &self.game.legal_moves()));
        if let Err(e) = self.engine.set_config(saved) {
            warn!("{}", e);
        }

        match result {
            Ok(result) => self.report(&result),
            Err(e) => {
                warn!("search failed: {}", e);
                self.send("bestmove 0000")
            }
        }
    }

    fn report(&mut self, result: &SearchResult) -> io::Result<()> {
        let Some(mv) = result.best_move else {
            return self.send("bestmove 0000");
        };
        self.send(&format!(
            "info depth {} score {} nodes {} pv {}",
            result.depth,
            format_score(result.score, result.depth),
            result.nodes,
            mv.to_uci()
        ))?;
        self.send(&format!("bestmove {}", mv.to_uci()))
    }

    fn cmd_display(&mut self) -> io::Result<()> {
        let position = self.game.position().clone();
        self.send(&position.display())?;
        self.send(&format!("FEN: {}", position.to_fen()))?;
        self.send(&format!("Status: {:?}", self.game.status()))?;

        let moves: Vec<String> = self.game.legal_moves().iter().map(|m| m.to_uci()).collect();
        self.send(&format!("Legal moves ({}): {}", moves.len(), moves.join(" ")))
    }

    fn cmd_perft(&mut self, args: &[&str]) -> io::Result<()> {
        let depth = args.first().and_then(|s| s.parse::<u32>().ok()).unwrap_or(1);
        let position = self.game.position().clone();
        let generator = crate::move_generator::MoveGenerator::new();

        let mut total = 0;
        for (mv, nodes) in generator.divide(&position, depth) {
            self.send(&format!("{}: {}", mv, nodes))?;
            total += nodes;
        }
        info!("perft {} = {}", depth, total);
        self.send(&format!("Nodes: {}", total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> UCIProtocol<Vec<u8>> {
        UCIProtocol::with_output(
            EngineConfig {
                depth: 2,
                seed: Some(11),
                ..EngineConfig::default()
            },
            Vec::new(),
        )
    }

    fn output(uci: &UCIProtocol<Vec<u8>>) -> String {
        String::from_utf8_lossy(uci.output()).into_owned()
    }

    #[test]
    fn handshake_lists_options() {
        let mut uci = session();
        uci.process_command("uci").unwrap();
        uci.process_command("isready").unwrap();
        let out = output(&uci);
        assert!(out.starts_with("id name DuelChess"));
        assert!(out.contains("option name Depth type spin default 2 min 1 max 32"));
        assert!(out.contains("option name Strategy type combo default search var search var random"));
        assert!(out.contains("uciok"));
        assert!(out.ends_with("readyok\n"));
    }

    #[test]
    fn position_with_moves() {
        let mut uci = session();
        uci.process_command("position startpos moves e2e4 e7e5 g1f3").unwrap();
        assert_eq!(
            uci.game().position().to_fen(),
            "rnbqkbnr/pppp1ppp/8/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R b KQkq - 1 2"
        );

        uci.process_command("position fen 4k3/8/8/8/8/8/8/4K2R w K - 0 1 moves e1g1").unwrap();
        assert_eq!(uci.game().position().to_fen(), "4k3/8/8/8/8/8/8/5RK1 b - - 1 1");
    }

    #[test]
    fn bad_position_keeps_previous_game() {
        let mut uci = session();
        uci.process_command("position startpos moves d2d4").unwrap();
        uci.process_command("position fen not a fen").unwrap();
        assert_eq!(uci.game().history().len(), 1);
    }

    #[test]
    fn setoption_updates_engine() {
        let mut uci = session();
        uci.process_command("setoption name Depth value 4").unwrap();
        uci.process_command("setoption name Strategy value random").unwrap();
        assert_eq!(uci.engine().config().depth, 4);
        assert_eq!(uci.engine().config().strategy, Strategy::Random);

        uci.process_command("setoption name Depth value 0").unwrap();
        assert_eq!(uci.engine().config().depth, 4);
    }

    #[test]
    fn go_reports_mate() {
        let mut uci = session();
        uci.process_command("position fen 6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1").unwrap();
        uci.process_command("go depth 2").unwrap();
        let out = output(&uci);
        assert!(out.contains("score mate 1"), "{}", out);
        assert!(out.trim_end().ends_with("bestmove a1a8"), "{}", out);
        // per-call depth does not stick
        assert_eq!(uci.engine().config().depth, 2);
    }

    #[test]
    fn go_without_moves_prints_null_move() {
        let mut uci = session();
        uci.process_command("position fen k7/8/1Q6/8/8/8/8/1K6 b - - 0 1").unwrap();
        uci.process_command("go").unwrap();
        assert!(output(&uci).contains("bestmove 0000"));
    }

    #[test]
    fn quit_stops_run_loop() {
        let mut uci = session();
        uci.run("isready\nquit\nisready\n".as_bytes()).unwrap();
        assert!(!uci.is_running());
        assert_eq!(output(&uci), "readyok\n");
    }

    #[test]
    fn mate_score_formatting() {
        assert_eq!(format_score(MATE_SCORE + 1, 2), "mate 1");
        assert_eq!(format_score(-(MATE_SCORE), 2), "mate -1");
        assert_eq!(format_score(MATE_SCORE, 3), "mate 2");
        assert_eq!(format_score(35, 3), "cp 35");
    }
}
