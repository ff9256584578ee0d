//! Subcommand handlers.

use std::io::{self, Write};

use anyhow::{bail, Result};
use tracing::{debug, warn};

use coursehub_core::models::{playback_access, Course, Lesson, Order, UserProfile};
use coursehub_core::{ApiClient, ApiError, Config};

use crate::cli::Command;

pub async fn execute(command: Command, client: &ApiClient, config: &mut Config) -> Result<()> {
    match command {
        Command::Login { username } => login(client, config, username).await,
        Command::Register { username, email } => register(client, config, &username, &email).await,
        Command::Logout => {
            client.logout()?;
            println!("Logged out.");
            Ok(())
        }
        Command::Status => {
            if client.is_authenticated() {
                let who = config.last_username.as_deref().unwrap_or("unknown user");
                println!("Logged in as {} ({})", who, client.pipeline().base_url());
            } else {
                println!("Not logged in.");
            }
            Ok(())
        }
        Command::Whoami => {
            let me = client.current_user().await?;
            print_profile(&me);
            Ok(())
        }
        Command::Courses => {
            let courses = client.list_courses().await?;
            print_courses(&courses);
            Ok(())
        }
        Command::Course { id } => {
            let course = client.get_course(id).await?;
            println!("#{} {} - {}", course.id, course.title, course.price_display());
            if !course.description.is_empty() {
                println!("\n{}", course.description);
            }
            Ok(())
        }
        Command::Lessons { course_id } => lessons(client, course_id).await,
        Command::Orders => {
            let orders = client.list_orders().await?;
            print_orders(&orders);
            Ok(())
        }
        Command::MyCourses => {
            let courses = client.list_my_courses().await?;
            print_courses(&courses);
            Ok(())
        }
        Command::Buy { course_id, note } => {
            let receipt = client.create_order(course_id, note.as_deref()).await?;
            match (receipt.success, receipt.order_number) {
                (true, Some(number)) => println!("Order {} placed. {}", number, receipt.message),
                (true, None) => println!("{}", receipt.message),
                (false, Some(number)) => println!("{} (order {})", receipt.message, number),
                (false, None) => bail!("Order refused: {}", receipt.message),
            }
            Ok(())
        }
        Command::Passwd => {
            let old = prompt_password("Current password: ")?;
            let new = prompt_password("New password: ")?;
            if new != prompt_password("Repeat new password: ")? {
                bail!("Passwords do not match");
            }
            let reply = client.change_password(&old, &new).await?;
            if !reply.success {
                bail!("Password not changed: {}", reply.message);
            }
            println!("{}", reply.message);
            Ok(())
        }
    }
}

async fn login(client: &ApiClient, config: &mut Config, username: Option<String>) -> Result<()> {
    let username = match username {
        Some(name) => name,
        None => prompt_username(config.last_username.as_deref())?,
    };
    let password = prompt_password("Password: ")?;

    client.login(&username, &password).await?;
    remember_username(config, username);
    println!("Login successful!");
    Ok(())
}

async fn register(
    client: &ApiClient,
    config: &mut Config,
    username: &str,
    email: &str,
) -> Result<()> {
    let password = prompt_password("Password: ")?;
    if password != prompt_password("Repeat password: ")? {
        bail!("Passwords do not match");
    }

    client.register_and_login(username, email, &password).await?;
    remember_username(config, username.to_string());
    println!("Account created, you are logged in.");
    Ok(())
}

fn remember_username(config: &mut Config, username: String) {
    config.last_username = Some(username);
    if let Err(e) = config.save() {
        warn!(error = %e, "Failed to save config");
    }
}

async fn lessons(client: &ApiClient, course_id: i64) -> Result<()> {
    let course = client.get_course(course_id).await?;
    let lessons = match client.list_lessons(course_id).await {
        Ok(lessons) => lessons,
        Err(e) if e.is_forbidden() => {
            let reason = e.detail().unwrap_or("purchase required");
            println!("{}: {}", course.title, reason);
            println!("Run `coursehub buy {}` to get access.", course_id);
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    // Viewer context only matters for paid content; anonymous browsing is fine
    let (me, orders) = if client.is_authenticated() && !course.is_free() {
        match viewer_context(client).await {
            Ok(ctx) => ctx,
            Err(ApiError::SessionExpired) => return Err(ApiError::SessionExpired.into()),
            Err(e) => {
                debug!(error = %e, "Could not load viewer context");
                (None, Vec::new())
            }
        }
    } else {
        (None, Vec::new())
    };

    println!("{} - {}", course.title, course.price_display());
    for lesson in &lessons {
        print_lesson(&course, lesson, me.as_ref(), &orders);
    }
    Ok(())
}

async fn viewer_context(client: &ApiClient) -> Result<(Option<UserProfile>, Vec<Order>), ApiError> {
    let me = client.current_user().await?;
    let orders = client.list_orders().await?;
    Ok((Some(me), orders))
}

// ===== Output =====

fn print_profile(me: &UserProfile) {
    println!("{} <{}>", me.display_name(), me.email);
    println!("  username: {}", me.username);
    println!("  role:     {}", me.role);
    if let Some(expiry) = me.vip_expiry_date.as_deref().filter(|d| !d.is_empty()) {
        println!("  VIP until {}", expiry);
    }
}

fn print_courses(courses: &[Course]) {
    if courses.is_empty() {
        println!("No courses.");
        return;
    }
    for course in courses {
        let star = if course.feature { "*" } else { " " };
        println!("{} #{:<4} {:<40} {}", star, course.id, course.title, course.price_display());
    }
}

fn print_lesson(course: &Course, lesson: &Lesson, me: Option<&UserProfile>, orders: &[Order]) {
    let access = playback_access(course, lesson, me, orders);
    let marker = if access.is_allowed() { "▶" } else { "🔒" };
    println!(
        "  {} #{:<4} {:<40} {:>8}",
        marker,
        lesson.id,
        lesson.title,
        lesson.duration_display()
    );
}

fn print_orders(orders: &[Order]) {
    if orders.is_empty() {
        println!("No orders.");
        return;
    }
    for order in orders {
        println!(
            "{:<20} course #{:<4} {:>8.2} {:<7} {}",
            order.order_number,
            order.course,
            order.price,
            order.status.as_str(),
            order.created_at
        );
    }
}

// ===== Prompts =====

fn prompt_username(last: Option<&str>) -> Result<String> {
    match last {
        Some(last) => print!("Username [{}]: ", last),
        None => print!("Username: "),
    }
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let input = input.trim();

    match (input.is_empty(), last) {
        (true, Some(last)) => Ok(last.to_string()),
        (true, None) => bail!("Username required"),
        (false, _) => Ok(input.to_string()),
    }
}

fn prompt_password(prompt: &str) -> Result<String> {
    let password = rpassword::prompt_password(prompt)?;
    Ok(password)
}
