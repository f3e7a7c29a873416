use clap::{Parser, Subcommand};
use dialoguer::{Input, Password};
use dotenvy::dotenv;
use nanapatha_cli::admin;
use nanapatha_cli::seeder::{self, PeopleConfig, SeedConfig};
use sqlx::PgPool;

#[derive(Parser)]
#[command(name = "nanapatha-cli")]
#[command(about = "Nanapatha CLI - Administrative tools for the Nanapatha back office", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new admin account
    CreateAdmin {
        /// Full name of the admin
        #[arg(short = 'n', long)]
        name: Option<String>,

        /// Email address
        #[arg(short = 'e', long)]
        email: Option<String>,

        /// Password (will be prompted securely if not provided)
        #[arg(short = 'p', long)]
        password: Option<String>,
    },
    /// Apply pending database migrations
    Migrate,
    /// Seed the database with batches, classrooms, teachers, students, sessions and registrations
    Seed {
        /// Number of batches to create
        #[arg(short = 'b', long, default_value = "8")]
        batches: usize,

        /// Number of classrooms to create
        #[arg(long, default_value = "4")]
        classrooms: usize,

        /// Number of teachers to create
        #[arg(long, default_value = "6")]
        teachers: usize,

        /// Number of students per batch (never more than its capacity)
        #[arg(long, default_value = "15")]
        students: usize,

        /// Number of students without a batch
        #[arg(long, default_value = "10")]
        unassigned: usize,

        /// Number of sessions per batch this week
        #[arg(long, default_value = "2")]
        sessions: usize,

        /// Number of pending registration requests
        #[arg(long, default_value = "12")]
        registrations: usize,
    },
    /// Seed only batches
    SeedBatches {
        /// Number of batches to create
        #[arg(short = 'b', long, default_value = "8")]
        batches: usize,
    },
    /// Seed only classrooms
    SeedClassrooms {
        /// Number of classrooms to create
        #[arg(short = 'c', long, default_value = "4")]
        classrooms: usize,
    },
    /// Seed teachers and place them on batches without one
    SeedTeachers {
        /// Number of teachers to create
        #[arg(short = 't', long, default_value = "6")]
        teachers: usize,
    },
    /// Seed students into free seats of existing batches
    SeedStudents {
        /// Number of students per batch
        #[arg(long, default_value = "15")]
        students: usize,

        /// Number of students without a batch
        #[arg(long, default_value = "10")]
        unassigned: usize,
    },
    /// Seed this week's sessions for existing batches
    SeedSessions {
        /// Number of sessions per batch
        #[arg(short = 's', long, default_value = "2")]
        sessions: usize,
    },
    /// Seed pending registration requests
    SeedRegistrations {
        /// Number of requests to create
        #[arg(short = 'r', long, default_value = "12")]
        registrations: usize,
    },
    /// Recount batch enrollment from student profiles
    ReconcileEnrollment,
    /// Clear all seeded data (keeps admins and hand-made records)
    ClearSeed,
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    let cli = Cli::parse();

    let database_url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => fail("DATABASE_URL must be set"),
    };

    let pool = match sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
    {
        Ok(pool) => pool,
        Err(e) => fail(&format!("Failed to connect to database: {}", e)),
    };

    match cli.command {
        Commands::CreateAdmin {
            name,
            email,
            password,
        } => handle_create_admin(&pool, name, email, password).await,
        Commands::Migrate => handle_migrate(&pool).await,
        Commands::Seed {
            batches,
            classrooms,
            teachers,
            students,
            unassigned,
            sessions,
            registrations,
        } => {
            let config = SeedConfig::new(batches)
                .with_classrooms(classrooms)
                .with_sessions(sessions)
                .with_people(PeopleConfig {
                    teachers,
                    students_per_batch: students,
                    unassigned_students: unassigned,
                    registrations,
                });
            report(seeder::seed_all(&pool, config).await, "seeding database");
        }
        Commands::SeedBatches { batches } => {
            let ids = report(seeder::seed_batches_only(&pool, batches).await, "seeding batches");
            println!("✅ Created {} batches", ids.len());
        }
        Commands::SeedClassrooms { classrooms } => {
            let ids = report(
                seeder::seed_classrooms_only(&pool, classrooms).await,
                "seeding classrooms",
            );
            println!("✅ Created {} classrooms", ids.len());
        }
        Commands::SeedTeachers { teachers } => {
            let created = report(
                seeder::seed_teachers_only(&pool, teachers).await,
                "seeding teachers",
            );
            println!("✅ Created {} teachers", created);
        }
        Commands::SeedStudents {
            students,
            unassigned,
        } => {
            let created = report(
                seeder::seed_students_only(&pool, students, unassigned).await,
                "seeding students",
            );
            println!("✅ Created {} students", created);
        }
        Commands::SeedSessions { sessions } => {
            let created = report(
                seeder::seed_sessions_only(&pool, sessions).await,
                "seeding sessions",
            );
            println!("✅ Created {} sessions", created);
        }
        Commands::SeedRegistrations { registrations } => {
            let created = report(
                seeder::seed_registrations_only(&pool, registrations).await,
                "seeding registration requests",
            );
            println!("✅ Created {} registration requests", created);
        }
        Commands::ReconcileEnrollment => {
            let updated = report(
                admin::reconcile_enrollment(&pool).await,
                "reconciling enrollment",
            );
            println!("✅ Corrected enrollment on {} batches", updated);
        }
        Commands::ClearSeed => report(seeder::clear_all(&pool).await, "clearing seeded data"),
    }
}

async fn handle_create_admin(
    pool: &PgPool,
    name: Option<String>,
    email: Option<String>,
    password: Option<String>,
) {
    let name = match name {
        Some(name) => name,
        None => report(
            Input::new().with_prompt("Full name").interact_text(),
            "reading name",
        ),
    };

    let email = match email {
        Some(email) => email,
        None => report(
            Input::new().with_prompt("Email address").interact_text(),
            "reading email",
        ),
    };

    let password = match password {
        Some(password) => password,
        None => report(
            Password::new()
                .with_prompt("Password")
                .with_confirmation("Confirm password", "Passwords don't match")
                .interact(),
            "reading password",
        ),
    };

    match admin::create_admin(pool, &name, &email, &password).await {
        Ok(_) => {
            println!("\n✅ Admin created successfully!");
            println!("   Email: {}", email.trim().to_lowercase());
            println!("   Name: {}", name.trim());
        }
        Err(e) => fail(&format!("Error creating admin: {}", e)),
    }
}

async fn handle_migrate(pool: &PgPool) {
    match nanapatha_db::run_migrations(pool).await {
        Ok(()) => println!("✅ Migrations applied"),
        Err(e) => fail(&format!("Error applying migrations: {}", e)),
    }
}

/// Unwraps a result or exits with the error and what was being attempted.
fn report<T, E: std::fmt::Display>(result: Result<T, E>, action: &str) -> T {
    match result {
        Ok(value) => value,
        Err(e) => fail(&format!("Error {}: {}", action, e)),
    }
}

fn fail(message: &str) -> ! {
    eprintln!("\n❌ {}", message);
    std::process::exit(1);
}
