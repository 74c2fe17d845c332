//! Attack table inspector - build, verify and query the precomputed tables
//!
//! Usage: cargo run --release --bin attack_tables -- verify
//!        cargo run --release --bin attack_tables -- show R a1 --occupied a4,c1
//!        cargo run --release --bin attack_tables -- attackers "<fen>" e4

use std::time::Instant;

use clap::{Parser, Subcommand};
use color_eyre::eyre::eyre;
use log::info;
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

use chess_attacks::bitboard::{format_bitboard, parse_square, sq_to_bb, square_name, BitboardIter};
use chess_attacks::magic::Indexing;
use chess_attacks::{
    attack_bb, attackers, initialize, king_attacked, pawn_attack_bb, AttackTables, Bitboard,
    Board, Color, PieceBoard, PieceType,
};

#[derive(Parser, Debug)]
#[command(name = "attack_tables")]
#[command(about = "Build, verify and inspect chess attack tables")]
struct Args {
    /// Log table construction details
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the tables with both indexing schemes and check them exhaustively
    Verify,
    /// Print the squares a piece attacks
    Show {
        /// Piece letter; uppercase is white, lowercase is black (matters for pawns)
        piece: char,
        /// Square the piece stands on, e.g. e4
        square: String,
        /// Comma separated list of occupied squares
        #[arg(long, value_delimiter = ',')]
        occupied: Vec<String>,
    },
    /// Print the pieces attacking a square in a FEN position
    Attackers {
        fen: String,
        square: String,
    },
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    TermLogger::init(level, Config::default(), TerminalMode::Stderr, ColorChoice::Auto)?;

    match args.command {
        Command::Verify => verify(),
        Command::Show {
            piece,
            square,
            occupied,
        } => show(piece, &square, &occupied),
        Command::Attackers { fen, square } => show_attackers(&fen, &square),
    }
}

fn verify() -> color_eyre::Result<()> {
    println!("native indexing: {}", Indexing::NATIVE.to_human());

    let mut built = Vec::new();
    for indexing in [Indexing::Magic, Indexing::Gather] {
        let start = Instant::now();
        let tables = AttackTables::with_indexing(indexing);
        let build_time = start.elapsed();

        let start = Instant::now();
        let report = tables.verify()?;
        println!("{}", report);
        println!(
            "  built in {:.3}s, verified in {:.3}s",
            build_time.as_secs_f64(),
            start.elapsed().as_secs_f64()
        );
        built.push(tables);
    }

    let compared = built[0].compare(&built[1])?;
    println!("multiply-shift and bit-gather agree on {} occupancies", compared);
    Ok(())
}

fn show(piece: char, square: &str, occupied: &[String]) -> color_eyre::Result<()> {
    let piece_type = PieceType::from_char(piece)?;
    let sq = parse_square(square)?;
    let occupied = occupied
        .iter()
        .map(|name| parse_square(name).map(sq_to_bb))
        .collect::<chess_attacks::Result<Vec<Bitboard>>>()?
        .into_iter()
        .fold(sq_to_bb(sq), |acc, bb| acc | bb);

    initialize();
    let attacks = match piece_type {
        PieceType::Pawn => pawn_attack_bb(Color::from_case(piece), sq),
        _ => attack_bb(piece_type, sq, occupied),
    };

    println!(
        "{} {} on {}: {} squares",
        Color::from_case(piece).to_human(),
        piece_type.to_human(),
        square_name(sq),
        attacks.count_ones()
    );
    print!("{}", format_bitboard(attacks));
    Ok(())
}

fn show_attackers(fen: &str, square: &str) -> color_eyre::Result<()> {
    let board = Board::from_fen(fen)?;
    let sq = parse_square(square)?;
    initialize();

    let found = attackers(&board, sq, board.occupied());
    info!("{} attackers of {}", found.count_ones(), square_name(sq));

    for color in Color::ALL {
        let names: Vec<String> = BitboardIter(found & board.color_bb(color))
            .map(|from| {
                let (_, piece_type) = board
                    .piece_at(from)
                    .ok_or_else(|| eyre!("no piece on {}", square_name(from)))?;
                Ok(format!("{}{}", piece_type.to_char(), square_name(from)))
            })
            .collect::<color_eyre::Result<_>>()?;
        println!("{}: {}", color.to_human(), names.join(" "));
    }
    print!("{}", format_bitboard(found));

    for color in Color::ALL {
        if king_attacked(&board, color) {
            println!("{} king is in check", color.to_human());
        }
    }
    println!("{} to move", board.side_to_move().to_human());
    Ok(())
}
