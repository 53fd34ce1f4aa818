pub mod terminal_stats;
