//! Command-line interface definition for CourseHub.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// CourseHub - browse and buy courses from the terminal
#[derive(Parser, Debug, Clone)]
#[command(name = "coursehub")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Backend API base URL (overrides COURSEHUB_API_URL and the config file)
    #[arg(long)]
    pub api_url: Option<String>,

    /// Also write logs to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Log in and store the session tokens
    Login {
        /// Username (prompted for when omitted)
        #[arg(short, long)]
        username: Option<String>,
    },

    /// Create an account and log in
    Register {
        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        email: String,
    },

    /// Forget the stored session
    Logout,

    /// Show whether a session is stored
    Status,

    /// Show the logged-in user's profile
    Whoami,

    /// List all courses
    Courses,

    /// Show one course
    Course { id: i64 },

    /// List the lessons of a course with playback access
    Lessons { course_id: i64 },

    /// List your orders
    Orders,

    /// List the courses you can watch
    MyCourses,

    /// Place an order for a course
    Buy {
        course_id: i64,

        /// Note attached to the order
        #[arg(long)]
        note: Option<String>,
    },

    /// Change your password
    Passwd,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_buy_with_note() {
        let cli = Cli::parse_from(["coursehub", "buy", "42", "--note", "gift"]);
        match cli.command {
            Command::Buy { course_id, note } => {
                assert_eq!(course_id, 42);
                assert_eq!(note.as_deref(), Some("gift"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_global_api_url() {
        let cli = Cli::parse_from(["coursehub", "--api-url", "http://shop/api", "my-courses"]);
        assert_eq!(cli.api_url.as_deref(), Some("http://shop/api"));
        assert!(matches!(cli.command, Command::MyCourses));
    }
}
