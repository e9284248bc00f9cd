/// Ordinal form of a rank: 1st, 2nd, 3rd, 4th, 11th, 22nd...
pub fn format_rank(rank: usize) -> String {
    let suffix = match (rank % 10, rank % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{rank}{suffix}")
}
