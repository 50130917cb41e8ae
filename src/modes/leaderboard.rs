use crate::store::{leaderboard, ScoreStore};

/// Ranked leaderboard lines, best first
pub fn format_leaderboard(store: &dyn ScoreStore) -> Vec<String> {
    leaderboard(store.load_all())
        .iter()
        .enumerate()
        .map(|(rank, record)| format!("{:>3}. {:<20} {:>12.0}", rank + 1, record.username, record.score))
        .collect()
}

pub fn print_leaderboard(store: &dyn ScoreStore) {
    println!("{}", "=".repeat(40));
    println!("Leaderboard");
    println!("{}", "=".repeat(40));

    let lines = format_leaderboard(store);
    if lines.is_empty() {
        println!("No scores yet");
    }
    for line in lines {
        println!("{}", line);
    }
}
