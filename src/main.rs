//! Command-line front-end for the campus portal.
//!
//! Each invocation restores the stored session, performs one command through
//! the same reducer a graphical front-end would use, waits for the backend to
//! answer, and prints the resulting screen plus any notifications.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tokio::time::Instant;

use campus_portal::app::ListKind;
use campus_portal::domain::{
    CommentDraft, Credentials, PostDraft, ProfilePicture, ProfileUpdate, Registration, Role,
    TeacherDraft, Vote,
};
use campus_portal::routing::Route;
use campus_portal::ui::{Renderer, Theme};
use campus_portal::{Config, Event, Portal, Result};

#[derive(Debug, Parser)]
#[command(name = "campus-portal", version, about = "Courses, teachers and discussions from the terminal")]
struct Cli {
    /// TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Overrides `base_url`.
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Built-in theme name or path to a theme TOML file.
    #[arg(long, global = true)]
    theme: Option<String>,

    /// Print without colors.
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Sign in and remember the session.
    Login {
        /// E-mail or ERP.
        username: String,
        #[arg(long)]
        password: String,
        /// Sign in as administrator.
        #[arg(long)]
        admin: bool,
    },
    /// Forget the stored session.
    Logout,
    /// Show who the stored session belongs to.
    Whoami,
    /// Create an account.
    Register(RegisterArgs),
    /// Show the profile.
    Profile,
    /// Change first and last name, optionally the picture.
    UpdateProfile {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        picture: Option<PathBuf>,
    },
    /// List courses.
    Courses(ListArgs),
    /// Show one course with its teachers.
    Course { id: String },
    /// List teachers.
    Teachers(ListArgs),
    /// Show one teacher.
    Teacher { id: String },
    /// Create or update a teacher (admin).
    SaveTeacher(TeacherArgs),
    /// Delete a teacher (admin).
    DeleteTeacher { id: String },
    /// List discussion posts.
    Posts,
    /// Show a post and its comments.
    Post { id: String },
    /// Start a discussion.
    NewPost {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
        #[arg(long)]
        anonymous: bool,
    },
    /// Upvote a post, or downvote with `--down`.
    Vote {
        id: String,
        #[arg(long)]
        down: bool,
    },
    /// Delete a post.
    DeletePost { id: String },
    /// Comment on a post.
    Comment {
        post_id: String,
        text: String,
        #[arg(long)]
        anonymous: bool,
    },
    /// Open any client path, e.g. `/teachers/new`.
    Open { path: String },
}

#[derive(Debug, Args)]
struct ListArgs {
    #[arg(long)]
    search: Option<String>,
    #[arg(long, default_value_t = 1)]
    page: u32,
}

#[derive(Debug, Args)]
struct RegisterArgs {
    #[arg(long)]
    email: String,
    #[arg(long)]
    password: String,
    #[arg(long)]
    first_name: String,
    #[arg(long)]
    last_name: String,
    #[arg(long)]
    erp: String,
    #[arg(long, default_value = "User")]
    role: String,
}

#[derive(Debug, Args)]
struct TeacherArgs {
    /// Existing teacher to update; omit to create.
    #[arg(long)]
    id: Option<String>,
    #[arg(long)]
    name: String,
    #[arg(long)]
    title: String,
    #[arg(long)]
    email: String,
    #[arg(long, default_value = "")]
    overview: String,
    #[arg(long)]
    department: String,
    #[arg(long, default_value = "")]
    specialization: String,
    /// Comma-separated course names.
    #[arg(long)]
    courses: String,
}

fn load_config(cli: &Cli) -> Result<Config> {
    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    let mut config = config.with_env_overrides(std::env::vars());
    if let Some(base_url) = &cli.base_url {
        config.base_url.clone_from(base_url);
    }
    Ok(config)
}

fn load_theme(cli: &Cli) -> Result<Option<Theme>> {
    if cli.no_color {
        return Ok(None);
    }
    match cli.theme.as_deref() {
        None => Ok(Some(Theme::default())),
        Some(name) => match Theme::from_name(name) {
            Some(theme) => Ok(Some(theme)),
            None => Theme::from_file(name).map(Some),
        },
    }
}

fn picture(path: &Path) -> Result<ProfilePicture> {
    let bytes = std::fs::read(path)?;
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    let mime_type = match extension.as_str() {
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "image/jpeg",
    };
    Ok(ProfilePicture {
        file_name: path
            .file_name()
            .map_or_else(|| "picture".to_string(), |n| n.to_string_lossy().into_owned()),
        mime_type: mime_type.to_string(),
        bytes,
    })
}

/// Dispatches `event` and waits until every resulting request has answered.
async fn run(portal: &mut Portal, event: Event) -> Result<()> {
    portal.dispatch(event)?;
    portal.settle().await
}

async fn browse_list(portal: &mut Portal, list: ListKind, args: &ListArgs) -> Result<()> {
    run(portal, Event::Navigate(format!("/{list}"))).await?;
    if let Some(search) = &args.search {
        run(
            portal,
            Event::SearchInput {
                list,
                text: search.clone(),
                at: Instant::now(),
            },
        )
        .await?;
    }
    if args.page != 1 {
        run(portal, Event::ChangePage { list, page: args.page }).await?;
    }
    Ok(())
}

async fn execute(portal: &mut Portal, command: Command) -> Result<()> {
    let event = match command {
        Command::Login {
            username,
            password,
            admin,
        } => Event::Login(Credentials {
            login_username: username,
            password,
            role: if admin { Role::Admin } else { Role::User },
        }),
        Command::Logout => Event::Logout,
        Command::Whoami => return Ok(()),
        Command::Register(args) => Event::Register(Registration {
            email: args.email,
            password: args.password,
            first_name: args.first_name,
            last_name: args.last_name,
            erp: args.erp,
            role: args.role,
        }),
        Command::Profile => Event::Navigate("/profile".into()),
        Command::UpdateProfile {
            first_name,
            last_name,
            picture: path,
        } => {
            run(portal, Event::Navigate("/profile".into())).await?;
            Event::UpdateProfile(ProfileUpdate {
                first_name,
                last_name,
                picture: path.as_deref().map(picture).transpose()?,
            })
        }
        Command::Courses(args) => return browse_list(portal, ListKind::Courses, &args).await,
        Command::Course { id } => Event::Navigate(format!("/course/{id}")),
        Command::Teachers(args) => return browse_list(portal, ListKind::Teachers, &args).await,
        Command::Teacher { id } => Event::Navigate(format!("/teachers/{id}")),
        Command::SaveTeacher(args) => Event::SaveTeacher {
            id: args.id,
            draft: TeacherDraft {
                name: args.name,
                title: args.title,
                email: args.email,
                overview: args.overview,
                department: args.department,
                specialization: args.specialization,
                courses_taught: args.courses,
            },
        },
        Command::DeleteTeacher { id } => Event::DeleteTeacher { id },
        Command::Posts => Event::Navigate("/posts".into()),
        Command::Post { id } => Event::Navigate(format!("/posts/{id}")),
        Command::NewPost {
            title,
            content,
            anonymous,
        } => {
            run(portal, Event::Navigate("/posts".into())).await?;
            Event::SubmitPost(PostDraft {
                title,
                content,
                anonymous,
            })
        }
        Command::Vote { id, down } => {
            run(portal, Event::Navigate(format!("/posts/{id}"))).await?;
            Event::VotePost {
                post_id: id,
                vote: if down { Vote::Down } else { Vote::Up },
            }
        }
        Command::DeletePost { id } => {
            run(portal, Event::Navigate("/posts".into())).await?;
            Event::DeletePost { post_id: id }
        }
        Command::Comment {
            post_id,
            text,
            anonymous,
        } => {
            run(portal, Event::Navigate(format!("/posts/{post_id}"))).await?;
            Event::SubmitComment(CommentDraft {
                post_id,
                text,
                anonymous,
            })
        }
        Command::Open { path } => Event::Navigate(path),
    };
    run(portal, event).await
}

/// Renders whatever the current route shows.
fn screen(portal: &Portal, renderer: Renderer<'_>, whoami: bool) -> String {
    let state = portal.state();
    if whoami {
        return match state.identity() {
            Some(identity) => {
                let roles: Vec<&str> = identity.roles.iter().map(Role::as_str).collect();
                format!("{} <{}> [{}]", identity.display_name, identity.email, roles.join(", "))
            }
            None => "Not signed in".to_string(),
        };
    }

    let record = |error: Option<&String>, body: Option<String>| {
        body.or_else(|| error.cloned())
            .unwrap_or_else(|| "Loading…".to_string())
    };

    match &state.route {
        None => String::new(),
        Some(Route::Courses) => renderer.list(&state.compute_list_viewmodel(ListKind::Courses)),
        Some(Route::Teachers) => renderer.list(&state.compute_list_viewmodel(ListKind::Teachers)),
        Some(Route::Course { .. }) => record(
            state.course_details.error.as_ref(),
            state.course_details.value.as_ref().map(|c| renderer.course(c)),
        ),
        Some(Route::Teacher { .. } | Route::EditTeacher { .. }) => record(
            state.teacher_details.error.as_ref(),
            state.teacher_details.value.as_ref().map(|t| renderer.teacher(t)),
        ),
        Some(Route::Home | Route::Posts) => record(
            state.posts.error.as_ref(),
            state.posts.value.as_deref().map(|p| renderer.posts(p)),
        ),
        Some(Route::Post { .. }) => record(
            state.post_details.error.as_ref(),
            state.post_details.value.as_ref().map(|post| {
                renderer.post(post, state.comments.value.as_deref().unwrap_or_default())
            }),
        ),
        Some(Route::Profile) => record(
            state.profile.error.as_ref(),
            state.profile.value.as_ref().map(|p| renderer.profile(p)),
        ),
        Some(Route::NewTeacher) => "New teacher form (use `save-teacher`)".to_string(),
        Some(Route::Login) => "Please log in (use `login`)".to_string(),
        Some(Route::Register) => "Create an account (use `register`)".to_string(),
        Some(Route::Unauthorized) => "You are not authorized to view this page.".to_string(),
    }
}

async fn try_main(cli: Cli) -> Result<bool> {
    let config = load_config(&cli)?;
    campus_portal::observability::init_tracing(&config);
    let theme = load_theme(&cli)?;
    let renderer = theme.as_ref().map_or_else(Renderer::plain, Renderer::themed);

    let mut portal = campus_portal::initialize(&config)?;
    portal.start()?;
    portal.settle().await?;

    let whoami = matches!(cli.command, Command::Whoami);
    execute(&mut portal, cli.command).await?;

    let notifications = portal.drain_notifications();
    let failed = notifications.iter().any(|n| n.is_error()) || portal.state().form_error.is_some();

    let body = screen(&portal, renderer, whoami);
    if !body.is_empty() {
        println!("{body}");
    }
    if let Some(form_error) = &portal.state().form_error {
        eprintln!("{}", form_error.message);
    }
    if !notifications.is_empty() {
        eprintln!("{}", renderer.notifications(&notifications));
    }
    Ok(!failed)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match try_main(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("campus-portal: {e}");
            ExitCode::FAILURE
        }
    }
}
