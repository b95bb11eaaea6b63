use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use clap::{Parser, Subcommand};
use tabled::{settings::Style, Table, Tabled};
use tracing_subscriber::EnvFilter;

use cashbuild::collections::{self, WebhookDispatcher};
use cashbuild::config::{config_dir, load_config, load_store, save_store, CONFIG_TEMPLATE};
use cashbuild::error::{CashbuildError, Result};
use cashbuild::ledger::{
    EmailOverrides, InvoiceDraft, InvoicePatch, InvoiceStatus, ReminderFrequency, Store,
};
use cashbuild::money::{format_amount, format_whole_money};
use cashbuild::report::cashflow_summary;
use cashbuild::retention;

#[derive(Parser)]
#[command(name = "cashbuild")]
#[command(version, about = "Construction invoicing and payment-collections CLI", long_about = None)]
struct Cli {
    /// Path to config directory (default: ~/.cashbuild or XDG config)
    #[arg(short = 'C', long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize config directory with a template config file
    Init,

    /// Create a new invoice
    Create {
        /// Invoice number (e.g., INV-2026-0001)
        #[arg(short, long)]
        number: String,

        /// Client name
        #[arg(short, long)]
        client: String,

        /// Client billing email
        #[arg(long)]
        email: Option<String>,

        /// Project name
        #[arg(long)]
        project: Option<String>,

        /// Base contract amount before variations and retention
        #[arg(short, long)]
        amount: f64,

        /// Due date (YYYY-MM-DD or RFC 3339)
        #[arg(short, long)]
        due: String,

        /// Retention percentage held against the gross total
        #[arg(long)]
        retention: Option<f64>,

        /// Retention release date (YYYY-MM-DD or RFC 3339)
        #[arg(long)]
        release: Option<String>,
    },

    /// List invoices, newest first
    List {
        /// Filter by status (unpaid, overdue, paid)
        #[arg(short, long)]
        status: Option<String>,

        /// Number of invoices to show (default: all)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show one invoice in full
    Show {
        /// Index from 'list', invoice number, or id
        invoice: String,
    },

    /// Edit an invoice's details
    Edit {
        /// Index from 'list', invoice number, or id
        invoice: String,

        /// New invoice number
        #[arg(long)]
        number: Option<String>,

        /// New client name
        #[arg(long)]
        client: Option<String>,

        /// New client billing email
        #[arg(long)]
        email: Option<String>,

        /// New project name
        #[arg(long)]
        project: Option<String>,

        /// New base amount
        #[arg(long)]
        amount: Option<f64>,

        /// New due date (YYYY-MM-DD or RFC 3339)
        #[arg(long)]
        due: Option<String>,

        /// Custom reminder text for stage 1 (1-7 days overdue)
        #[arg(long)]
        stage1_email: Option<String>,

        /// Custom reminder text for stage 2 (8-14 days overdue)
        #[arg(long)]
        stage2_email: Option<String>,

        /// Custom reminder text for stage 3 (15+ days overdue)
        #[arg(long)]
        stage3_email: Option<String>,
    },

    /// Delete an invoice
    Delete {
        /// Index from 'list', invoice number, or id
        invoice: String,
    },

    /// Record a contract variation against an invoice
    AddVariation {
        /// Index from 'list', invoice number, or id
        invoice: String,

        /// What changed
        #[arg(short, long)]
        description: String,

        /// Signed amount; negative reduces the gross total
        #[arg(short, long, allow_hyphen_values = true)]
        amount: f64,
    },

    /// Set retention terms on an invoice
    SetRetention {
        /// Index from 'list', invoice number, or id
        invoice: String,

        /// Percentage of the gross total to hold
        #[arg(short, long)]
        percentage: f64,

        /// Release date (YYYY-MM-DD or RFC 3339); omit to clear
        #[arg(long)]
        release: Option<String>,
    },

    /// Mark an invoice as paid and stop collections
    MarkPaid {
        /// Index from 'list', invoice number, or id
        invoice: String,
    },

    /// Send a payment reminder now
    Remind {
        /// Index from 'list', invoice number, or id
        invoice: String,
    },

    /// Start automated chasing and notify the automation engine
    Activate {
        /// Index from 'list', invoice number, or id
        invoice: String,

        /// Cadence (hourly, daily, weekly); default from config
        #[arg(short, long)]
        frequency: Option<String>,
    },

    /// Pause automated chasing
    Pause {
        /// Index from 'list', invoice number, or id
        invoice: String,
    },

    /// Change the reminder cadence without touching the automation engine
    SetFrequency {
        /// Index from 'list', invoice number, or id
        invoice: String,

        /// Cadence (hourly, daily, weekly, disabled)
        frequency: String,
    },

    /// Show held retentions and their release status
    Retentions,

    /// Show the cashflow summary
    Summary,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Determine config directory
    let cfg_dir = match cli.config_dir {
        Some(p) => p,
        None => config_dir()?,
    };

    match cli.command {
        Commands::Init => cmd_init(&cfg_dir),
        Commands::Create {
            number,
            client,
            email,
            project,
            amount,
            due,
            retention,
            release,
        } => cmd_create(
            &cfg_dir, number, client, email, project, amount, &due, retention, release,
        ),
        Commands::List { status, limit } => cmd_list(&cfg_dir, status, limit),
        Commands::Show { invoice } => cmd_show(&cfg_dir, &invoice),
        Commands::Edit {
            invoice,
            number,
            client,
            email,
            project,
            amount,
            due,
            stage1_email,
            stage2_email,
            stage3_email,
        } => cmd_edit(
            &cfg_dir,
            &invoice,
            number,
            client,
            email,
            project,
            amount,
            due,
            stage1_email,
            stage2_email,
            stage3_email,
        ),
        Commands::Delete { invoice } => cmd_delete(&cfg_dir, &invoice),
        Commands::AddVariation {
            invoice,
            description,
            amount,
        } => cmd_add_variation(&cfg_dir, &invoice, &description, amount),
        Commands::SetRetention {
            invoice,
            percentage,
            release,
        } => cmd_set_retention(&cfg_dir, &invoice, percentage, release),
        Commands::MarkPaid { invoice } => cmd_mark_paid(&cfg_dir, &invoice),
        Commands::Remind { invoice } => cmd_remind(&cfg_dir, &invoice),
        Commands::Activate { invoice, frequency } => cmd_activate(&cfg_dir, &invoice, frequency),
        Commands::Pause { invoice } => cmd_pause(&cfg_dir, &invoice),
        Commands::SetFrequency { invoice, frequency } => {
            cmd_set_frequency(&cfg_dir, &invoice, &frequency)
        }
        Commands::Retentions => cmd_retentions(&cfg_dir),
        Commands::Summary => cmd_summary(&cfg_dir),
    }
}

/// Initialize config directory with a template config file
fn cmd_init(cfg_dir: &PathBuf) -> Result<()> {
    use std::fs;

    if cfg_dir.exists() {
        return Err(CashbuildError::AlreadyInitialized(cfg_dir.clone()));
    }

    fs::create_dir_all(cfg_dir)?;
    fs::write(cfg_dir.join("config.toml"), CONFIG_TEMPLATE)?;

    println!("Initialized cashbuild config at: {}", cfg_dir.display());
    println!();
    println!("Next steps:");
    println!(
        "  1. Edit your company and user details:  $EDITOR {}/config.toml",
        cfg_dir.display()
    );
    println!("  2. Point the [webhooks] URLs at your automation endpoints (optional)");
    println!();
    println!("Then create your first invoice:");
    println!("  cashbuild create -n INV-2026-0001 -c \"Client Ltd\" -a 47500 -d 2026-09-30");

    Ok(())
}

// Table row structs for tabled
#[derive(Tabled)]
struct InvoiceRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "NUMBER")]
    number: String,
    #[tabled(rename = "CLIENT")]
    client: String,
    #[tabled(rename = "DUE DATE")]
    due: String,
    #[tabled(rename = "TOTAL")]
    total: String,
    #[tabled(rename = "STATUS")]
    status: String,
    #[tabled(rename = "STAGE")]
    stage: u8,
}

#[derive(Tabled)]
struct VariationRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "DESCRIPTION")]
    description: String,
    #[tabled(rename = "AMOUNT")]
    amount: String,
    #[tabled(rename = "ADDED")]
    added: String,
}

#[derive(Tabled)]
struct RetentionRow {
    #[tabled(rename = "NUMBER")]
    number: String,
    #[tabled(rename = "CLIENT")]
    client: String,
    #[tabled(rename = "PCT")]
    pct: String,
    #[tabled(rename = "HELD")]
    held: String,
    #[tabled(rename = "RELEASE DATE")]
    release: String,
    #[tabled(rename = "STATUS")]
    status: String,
}

/// Parse a date argument as either a plain date (midnight UTC) or a full
/// RFC 3339 timestamp.
fn parse_date(value: &str) -> Result<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|d| d.and_time(NaiveTime::MIN).and_utc())
        .map_err(|_| CashbuildError::InvalidDate(value.to_string()))
}

fn parse_status(value: &str) -> Result<InvoiceStatus> {
    value.parse().map_err(CashbuildError::InvalidInput)
}

fn parse_frequency(value: &str) -> Result<ReminderFrequency> {
    value.parse().map_err(CashbuildError::InvalidInput)
}

fn require_config_dir(cfg_dir: &PathBuf) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(CashbuildError::ConfigNotFound(cfg_dir.clone()));
    }
    Ok(())
}

/// Resolve an invoice reference to the store's opaque id.
/// Accepts a 1-based index from 'list', the invoice number, or the id itself.
fn resolve_invoice_id(store: &Store, reference: &str) -> Result<String> {
    if let Ok(idx) = reference.parse::<usize>() {
        if idx == 0 || idx > store.invoices.len() {
            return Err(CashbuildError::InvalidInvoiceIndex(reference.to_string()));
        }
        // The store keeps invoices newest first, matching 'list' order
        return Ok(store.invoices[idx - 1].id.clone());
    }

    store
        .invoices
        .iter()
        .find(|i| i.invoice_number == reference || i.id == reference)
        .map(|i| i.id.clone())
        .ok_or_else(|| CashbuildError::InvoiceNotFound(reference.to_string()))
}

#[allow(clippy::too_many_arguments)]
fn cmd_create(
    cfg_dir: &PathBuf,
    number: String,
    client: String,
    email: Option<String>,
    project: Option<String>,
    amount: f64,
    due: &str,
    retention: Option<f64>,
    release: Option<String>,
) -> Result<()> {
    require_config_dir(cfg_dir)?;

    let config = load_config(cfg_dir)?;
    let mut store = load_store(cfg_dir)?;
    let now = Utc::now();

    let draft = InvoiceDraft {
        invoice_number: Some(number),
        client_name: Some(client),
        client_email: email,
        project_name: project,
        amount: Some(amount),
        due_date: Some(parse_date(due)?),
        status: None,
        retention_percentage: retention,
        retention_release_date: release.as_deref().map(parse_date).transpose()?,
    };

    let invoice = store.create(draft, config.collections.default_frequency, now)?;
    let symbol = &config.invoice.currency_symbol;

    println!("Created {}", invoice.invoice_number);
    println!("  Client:  {}", invoice.client_name);
    println!("  Gross:   {}{}", symbol, format_amount(invoice.gross_total()));
    println!("  Status:  {}", invoice.status);

    save_store(cfg_dir, &store)?;
    Ok(())
}

fn cmd_list(cfg_dir: &PathBuf, status: Option<String>, limit: Option<usize>) -> Result<()> {
    require_config_dir(cfg_dir)?;

    let config = load_config(cfg_dir)?;
    let store = load_store(cfg_dir)?;
    let now = Utc::now();

    let filter = status.as_deref().map(parse_status).transpose()?;
    let invoices = store.list(filter, now);

    if invoices.is_empty() {
        println!("No invoices found.");
        return Ok(());
    }

    let shown = match limit {
        Some(n) => &invoices[..n.min(invoices.len())],
        None => &invoices[..],
    };

    let symbol = &config.invoice.currency_symbol;
    let rows: Vec<InvoiceRow> = shown
        .iter()
        .enumerate()
        .map(|(idx, inv)| InvoiceRow {
            index: idx + 1,
            number: inv.invoice_number.clone(),
            client: inv.client_name.clone(),
            due: inv.due_date.format("%Y-%m-%d").to_string(),
            total: format_whole_money(inv.gross_total(), symbol),
            status: inv.reconciled_status(now).to_string(),
            stage: collections::current_stage(inv, now),
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");

    // Financial summary over the shown invoices
    let total: f64 = shown.iter().map(|i| i.gross_total()).sum();
    let outstanding: f64 = shown
        .iter()
        .filter(|i| i.reconciled_status(now) != InvoiceStatus::Paid)
        .map(|i| i.gross_total())
        .sum();
    let overdue: f64 = shown
        .iter()
        .filter(|i| i.reconciled_status(now) == InvoiceStatus::Overdue)
        .map(|i| i.gross_total())
        .sum();

    println!();
    println!("Total: {} invoices, {}{}", shown.len(), symbol, format_amount(total));
    println!(
        "Outstanding: {}{} (overdue: {}{})",
        symbol,
        format_amount(outstanding),
        symbol,
        format_amount(overdue)
    );
    println!("Use index number with show/edit/remind/mark-paid (e.g., 'cashbuild show 1')");

    Ok(())
}

fn cmd_show(cfg_dir: &PathBuf, invoice_ref: &str) -> Result<()> {
    require_config_dir(cfg_dir)?;

    let config = load_config(cfg_dir)?;
    let store = load_store(cfg_dir)?;
    let now = Utc::now();

    let id = resolve_invoice_id(&store, invoice_ref)?;
    let inv = store.get(&id)?;
    let symbol = &config.invoice.currency_symbol;

    println!("{} — {}", inv.invoice_number, inv.client_name);
    println!("{}", "-".repeat(50));
    if !inv.project_name.is_empty() {
        println!("Project:          {}", inv.project_name);
    }
    if let Some(email) = &inv.client_email {
        println!("Client email:     {}", email);
    }
    println!("Status:           {}", inv.reconciled_status(now));

    let days_overdue = inv.days_overdue_at(now);
    if inv.status != InvoiceStatus::Paid && days_overdue > 0 {
        println!(
            "Due date:         {} ({} days overdue)",
            inv.due_date.format("%Y-%m-%d"),
            days_overdue
        );
    } else if inv.status != InvoiceStatus::Paid {
        println!(
            "Due date:         {} ({} days remaining)",
            inv.due_date.format("%Y-%m-%d"),
            inv.days_until_due_at(now)
        );
    } else {
        println!("Due date:         {}", inv.due_date.format("%Y-%m-%d"));
    }

    println!("Base amount:      {}{}", symbol, format_amount(inv.amount));
    if !inv.variations.is_empty() {
        println!(
            "Variations:       {}{}",
            symbol,
            format_amount(inv.variations_total())
        );
    }
    println!("Gross total:      {}{}", symbol, format_amount(inv.gross_total()));
    if inv.retention_percentage > 0.0 {
        println!(
            "Retention ({}%):   -{}{}",
            inv.retention_percentage,
            symbol,
            format_amount(inv.retention_amount())
        );
        let status = retention::classify(inv, now);
        match inv.retention_release_date {
            Some(release) => println!(
                "Retention status: {} (releases {})",
                status,
                release.format("%Y-%m-%d")
            ),
            None => println!("Retention status: {}", status),
        }
    }
    println!("Net payable:      {}{}", symbol, format_amount(inv.net_payable()));
    println!(
        "Chasing:          {} (stage {})",
        inv.reminder_frequency,
        collections::current_stage(inv, now)
    );
    if let Some(sent) = inv.last_reminder_sent {
        println!("Last reminder:    {}", sent.format("%Y-%m-%d %H:%M UTC"));
    }
    if let Some(next) = inv.next_scheduled_reminder {
        println!("Next reminder:    {}", next.format("%Y-%m-%d %H:%M UTC"));
    }

    if !inv.variations.is_empty() {
        println!();
        let rows: Vec<VariationRow> = inv
            .variations
            .iter()
            .enumerate()
            .map(|(idx, v)| VariationRow {
                index: idx + 1,
                description: v.description.clone(),
                amount: format!("{}{}", symbol, format_amount(v.amount)),
                added: v.date_added.format("%Y-%m-%d").to_string(),
            })
            .collect();
        let table = Table::new(rows).with(Style::rounded()).to_string();
        println!("{table}");
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn cmd_edit(
    cfg_dir: &PathBuf,
    invoice_ref: &str,
    number: Option<String>,
    client: Option<String>,
    email: Option<String>,
    project: Option<String>,
    amount: Option<f64>,
    due: Option<String>,
    stage1_email: Option<String>,
    stage2_email: Option<String>,
    stage3_email: Option<String>,
) -> Result<()> {
    require_config_dir(cfg_dir)?;

    if number.is_none()
        && client.is_none()
        && email.is_none()
        && project.is_none()
        && amount.is_none()
        && due.is_none()
        && stage1_email.is_none()
        && stage2_email.is_none()
        && stage3_email.is_none()
    {
        return Err(CashbuildError::InvalidInput(
            "No fields to update. Pass at least one --flag.".to_string(),
        ));
    }

    let mut store = load_store(cfg_dir)?;
    let id = resolve_invoice_id(&store, invoice_ref)?;

    let email_overrides = if stage1_email.is_some() || stage2_email.is_some() || stage3_email.is_some()
    {
        Some(EmailOverrides {
            stage1: stage1_email,
            stage2: stage2_email,
            stage3: stage3_email,
        })
    } else {
        None
    };

    let patch = InvoicePatch {
        invoice_number: number,
        client_name: client,
        client_email: email,
        project_name: project,
        amount,
        due_date: due.as_deref().map(parse_date).transpose()?,
        email_overrides,
        ..InvoicePatch::default()
    };

    let invoice = store.update(&id, patch)?;
    println!("Updated {}", invoice.invoice_number);

    save_store(cfg_dir, &store)?;
    Ok(())
}

fn cmd_delete(cfg_dir: &PathBuf, invoice_ref: &str) -> Result<()> {
    require_config_dir(cfg_dir)?;

    let mut store = load_store(cfg_dir)?;
    let id = resolve_invoice_id(&store, invoice_ref)?;
    let number = store.get(&id)?.invoice_number.clone();

    store.delete(&id)?;
    save_store(cfg_dir, &store)?;

    println!("Deleted {}", number);
    Ok(())
}

fn cmd_add_variation(
    cfg_dir: &PathBuf,
    invoice_ref: &str,
    description: &str,
    amount: f64,
) -> Result<()> {
    require_config_dir(cfg_dir)?;

    let config = load_config(cfg_dir)?;
    let mut store = load_store(cfg_dir)?;
    let id = resolve_invoice_id(&store, invoice_ref)?;

    let invoice = store.add_variation(&id, description, amount, Utc::now())?;
    let symbol = &config.invoice.currency_symbol;

    println!("Added variation to {}", invoice.invoice_number);
    println!("  {}: {}{}", description, symbol, format_amount(amount));
    println!("  New gross total: {}{}", symbol, format_amount(invoice.gross_total()));

    save_store(cfg_dir, &store)?;
    Ok(())
}

fn cmd_set_retention(
    cfg_dir: &PathBuf,
    invoice_ref: &str,
    percentage: f64,
    release: Option<String>,
) -> Result<()> {
    require_config_dir(cfg_dir)?;

    let config = load_config(cfg_dir)?;
    let mut store = load_store(cfg_dir)?;
    let id = resolve_invoice_id(&store, invoice_ref)?;
    let release_date = release.as_deref().map(parse_date).transpose()?;

    let invoice = store.set_retention(&id, percentage, release_date)?;
    let symbol = &config.invoice.currency_symbol;

    println!("Set {}% retention on {}", percentage, invoice.invoice_number);
    println!("  Held: {}{}", symbol, format_amount(invoice.retention_amount()));
    match invoice.retention_release_date {
        Some(date) => println!("  Releases: {}", date.format("%Y-%m-%d")),
        None => println!("  No release date set"),
    }

    save_store(cfg_dir, &store)?;
    Ok(())
}

fn cmd_mark_paid(cfg_dir: &PathBuf, invoice_ref: &str) -> Result<()> {
    require_config_dir(cfg_dir)?;

    let mut store = load_store(cfg_dir)?;
    let id = resolve_invoice_id(&store, invoice_ref)?;

    let invoice = store.get_mut(&id)?;
    collections::mark_paid(invoice);
    let number = invoice.invoice_number.clone();

    save_store(cfg_dir, &store)?;

    println!("Marked {} as paid (collections disabled)", number);
    Ok(())
}

fn cmd_remind(cfg_dir: &PathBuf, invoice_ref: &str) -> Result<()> {
    require_config_dir(cfg_dir)?;

    let config = load_config(cfg_dir)?;
    let dispatcher = WebhookDispatcher::from_settings(&config.webhooks);
    let mut store = load_store(cfg_dir)?;
    let id = resolve_invoice_id(&store, invoice_ref)?;

    let invoice = store.get_mut(&id)?;
    let days = collections::send_reminder_now(
        invoice,
        &config.user,
        &config.company,
        &dispatcher,
        Utc::now(),
    )?;
    let number = invoice.invoice_number.clone();
    let client = invoice.client_name.clone();

    save_store(cfg_dir, &store)?;

    if days > 0 {
        println!("Reminder sent to {} for {} ({} days overdue)", client, number, days);
    } else {
        println!("Reminder sent to {} for {}", client, number);
    }
    Ok(())
}

fn cmd_activate(cfg_dir: &PathBuf, invoice_ref: &str, frequency: Option<String>) -> Result<()> {
    require_config_dir(cfg_dir)?;

    let config = load_config(cfg_dir)?;
    let dispatcher = WebhookDispatcher::from_settings(&config.webhooks);
    let mut store = load_store(cfg_dir)?;
    let id = resolve_invoice_id(&store, invoice_ref)?;

    let frequency = match frequency.as_deref() {
        Some(f) => parse_frequency(f)?,
        None => config.collections.default_frequency,
    };

    let invoice = store.get_mut(&id)?;
    collections::activate(invoice, frequency, &dispatcher, Utc::now());
    let number = invoice.invoice_number.clone();

    save_store(cfg_dir, &store)?;

    println!("Collections activated for {} ({})", number, frequency);
    Ok(())
}

fn cmd_pause(cfg_dir: &PathBuf, invoice_ref: &str) -> Result<()> {
    require_config_dir(cfg_dir)?;

    let mut store = load_store(cfg_dir)?;
    let id = resolve_invoice_id(&store, invoice_ref)?;

    let invoice = store.get_mut(&id)?;
    collections::pause(invoice);
    let number = invoice.invoice_number.clone();

    save_store(cfg_dir, &store)?;

    println!("Collections paused for {}", number);
    Ok(())
}

fn cmd_set_frequency(cfg_dir: &PathBuf, invoice_ref: &str, frequency: &str) -> Result<()> {
    require_config_dir(cfg_dir)?;

    let mut store = load_store(cfg_dir)?;
    let id = resolve_invoice_id(&store, invoice_ref)?;
    let frequency = parse_frequency(frequency)?;

    let invoice = store.get_mut(&id)?;
    collections::set_frequency(invoice, frequency);
    let number = invoice.invoice_number.clone();

    save_store(cfg_dir, &store)?;

    println!("Reminder frequency for {} set to {}", number, frequency);
    Ok(())
}

fn cmd_retentions(cfg_dir: &PathBuf) -> Result<()> {
    require_config_dir(cfg_dir)?;

    let config = load_config(cfg_dir)?;
    let store = load_store(cfg_dir)?;
    let now = Utc::now();

    let held = retention::held_invoices(&store.invoices);
    if held.is_empty() {
        println!("No invoices with retention held.");
        return Ok(());
    }

    let symbol = &config.invoice.currency_symbol;
    let rows: Vec<RetentionRow> = held
        .iter()
        .map(|inv| RetentionRow {
            number: inv.invoice_number.clone(),
            client: inv.client_name.clone(),
            pct: format!("{}%", inv.retention_percentage),
            held: format_whole_money(inv.retention_amount(), symbol),
            release: inv
                .retention_release_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "-".to_string()),
            status: retention::classify(inv, now).to_string(),
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");

    let summary = retention::summarize(&store.invoices, now);
    println!();
    println!("Total held: {}{}", symbol, format_amount(summary.total_held));
    println!(
        "Due soon: {}  Overdue: {}",
        summary.due_soon, summary.overdue
    );

    Ok(())
}

fn cmd_summary(cfg_dir: &PathBuf) -> Result<()> {
    require_config_dir(cfg_dir)?;

    let config = load_config(cfg_dir)?;
    let store = load_store(cfg_dir)?;
    let summary = cashflow_summary(&store.invoices, Utc::now());
    let symbol = &config.invoice.currency_symbol;

    println!("Cashflow Summary");
    println!("{}", "-".repeat(50));
    println!("Company:          {}", config.company.name);
    println!("Total invoiced:   {}{}", symbol, format_amount(summary.total_invoiced));
    println!("Paid to date:     {}{}", symbol, format_amount(summary.paid_to_date));
    println!("Outstanding:      {}{}", symbol, format_amount(summary.outstanding));
    println!("Overdue:          {}{}", symbol, format_amount(summary.overdue));
    println!("Invoices:         {}", summary.invoice_count);
    println!("Active reminders: {}", summary.active_reminder_count);

    Ok(())
}
