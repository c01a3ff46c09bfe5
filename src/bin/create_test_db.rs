use std::error::Error;
use std::path::Path;
use std::process::exit;
use std::str::FromStr;

use clap::Parser;
use rust_decimal::Decimal;

use money_tracker::{
    DEFAULT_BUSY_TIMEOUT, Database, NewTransaction, NewUser, NewWallet, PasswordHash,
    TransactionType, WalletName, count_transactions_for_wallet, count_users, create_user,
    create_wallet, get_wallet, record_transaction,
};

/// A utility for creating a test database for the REST API server of money_tracker.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    if output_path.extension().is_none_or(|extension| extension.is_empty()) {
        eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
        exit(1);
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let database = Database::open(output_path, DEFAULT_BUSY_TIMEOUT)?;
    let mut conn = database.connect()?;

    println!("Creating test user...");
    let user = create_user(
        NewUser::new("Test User", "test@example.com")?,
        PasswordHash::DEFAULT_COST,
        &conn,
    )?;

    println!("Creating test wallet...");
    let wallet = create_wallet(
        NewWallet {
            user_id: user.id,
            name: WalletName::new("Everyday")?,
        },
        &conn,
    )?;

    println!("Recording test transactions...");
    for (transaction_type, amount, description) in [
        (TransactionType::Income, "1000", "Salary"),
        (TransactionType::Expense, "200", "Groceries"),
    ] {
        let new_transaction = NewTransaction::new(
            wallet.id,
            transaction_type,
            Decimal::from_str(amount)?,
            Some(description),
        )?;
        record_transaction(new_transaction, &mut conn)?;
    }

    let wallet = get_wallet(wallet.id, &conn)?;
    println!(
        "Success! Created {} user(s). Wallet {} has {} transactions and a balance of {}.",
        count_users(&conn)?,
        wallet.id,
        count_transactions_for_wallet(wallet.id, &conn)?,
        wallet.balance
    );

    Ok(())
}
