use std::env;
use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{Duration, OffsetDateTime};

use property_ledger::{
    Role, Transaction, TransactionStatus, TransactionType, Viewer, create_cookie_key,
    create_transaction, encode_viewer_cookie, initialize_db,
};

/// A utility for creating a test database for the Property Ledger server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,

    /// How many days the printed viewer cookies stay valid for.
    #[arg(long, default_value_t = 7)]
    cookie_days: i64,
}

const SELLERS: [(&str, &str); 2] = [("seller-1", "Omar Al-Farsi"), ("seller-2", "Layla Haddad")];

const BUYERS: [(&str, &str); 3] = [
    ("buyer-1", "Aisha Al-Harbi"),
    ("buyer-2", "Khalid Mansour"),
    ("buyer-3", "Noura Saleh"),
];

const PROPERTIES: [(&str, &str); 4] = [
    ("property-1", "Sea View Villa"),
    ("property-2", "Olaya Office Suite"),
    ("property-3", "Diriyah Townhouse"),
    ("property-4", "Corniche Apartment"),
];

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating demo transactions...");
    let count = create_demo_transactions(&conn, OffsetDateTime::now_utc())?;
    println!("Created {count} transactions.");

    match env::var("SECRET") {
        Ok(secret) => print_viewer_cookies(&secret, Duration::days(args.cookie_days))?,
        Err(_) => println!("Set SECRET to also print viewer cookies for the demo viewers."),
    }

    println!("Success!");

    Ok(())
}

/// Spread sales, refunds, commissions and withdrawals over the last year.
fn create_demo_transactions(
    conn: &Connection,
    now: OffsetDateTime,
) -> Result<usize, Box<dyn Error>> {
    let mut count = 0;

    for i in 0..48_usize {
        let (seller_id, seller_name) = SELLERS[i % SELLERS.len()];
        let (buyer_id, buyer_name) = BUYERS[i % BUYERS.len()];
        let (property_id, property_title) = PROPERTIES[i % PROPERTIES.len()];
        let created_at = now - Duration::days(7 * i as i64) - Duration::hours((i % 24) as i64);
        let amount = 1_000.0 + 250.0 * (i % 9) as f64;
        let status = match i % 10 {
            0 | 5 => TransactionStatus::Pending,
            7 => TransactionStatus::Failed,
            _ => TransactionStatus::Completed,
        };

        create_transaction(
            Transaction::build(
                TransactionType::Payment,
                amount,
                status,
                created_at,
                &format!("Rent payment for {property_title}"),
            )
            .buyer(buyer_id, buyer_name)
            .seller(seller_id, seller_name)
            .property(property_id, property_title),
            conn,
        )?;
        count += 1;

        if status == TransactionStatus::Completed {
            create_transaction(
                Transaction::build(
                    TransactionType::Commission,
                    amount * 0.025,
                    TransactionStatus::Completed,
                    created_at + Duration::minutes(5),
                    &format!("Platform commission for {property_title}"),
                )
                .seller(seller_id, seller_name)
                .property(property_id, property_title),
                conn,
            )?;
            count += 1;
        }

        if i % 11 == 3 {
            create_transaction(
                Transaction::build(
                    TransactionType::Refund,
                    amount / 2.0,
                    TransactionStatus::Completed,
                    created_at + Duration::days(2),
                    &format!("Deposit refund for {property_title}"),
                )
                .buyer(buyer_id, buyer_name)
                .seller(seller_id, seller_name)
                .property(property_id, property_title),
                conn,
            )?;
            count += 1;
        }

        if i % 8 == 6 {
            create_transaction(
                Transaction::build(
                    TransactionType::Withdrawal,
                    3_000.0,
                    TransactionStatus::Completed,
                    created_at + Duration::days(1),
                    "Withdrawal to bank account",
                )
                .seller(seller_id, seller_name),
                conn,
            )?;
            count += 1;
        }
    }

    Ok(count)
}

fn print_viewer_cookies(secret: &str, duration: Duration) -> Result<(), Box<dyn Error>> {
    let key = create_cookie_key(secret);
    let viewers = [
        Viewer::new("admin-1", Role::Admin),
        Viewer::new(SELLERS[0].0, Role::Seller),
        Viewer::new(BUYERS[0].0, Role::Buyer),
    ];

    println!("Viewer cookies, valid for {duration}:");
    for viewer in &viewers {
        let cookie = encode_viewer_cookie(&key, viewer, duration)?;
        println!("  {} {}: {cookie}", viewer.role, viewer.uid);
    }

    Ok(())
}
