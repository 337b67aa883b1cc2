use chrono::{DateTime, Local, Utc};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};
use tracing_subscriber::EnvFilter;

use clinic_billing::billing::{
    self, format_money, parse_amount, Invoice, InvoiceStatus, Ledger, NewInvoice, NewPayment, PaymentUpdate,
};
use clinic_billing::config::{config_dir, load_config, records_path, Config, CONFIG_FILE, CONFIG_TEMPLATE};
use clinic_billing::error::{BillingError, Result};
use clinic_billing::input::{parse_items, require_positive, resolve_payment_mode, retain_described};
use clinic_billing::records::find_patient;
use clinic_billing::report::{filter_invoices, write_invoices_csv, Period, Summary};
use clinic_billing::store::FileStore;

#[derive(Parser)]
#[command(name = "clinic")]
#[command(version, about = "Clinic billing: invoices, payments and billing history", long_about = None)]
struct Cli {
    /// Path to config directory (default: XDG config dir or ~/.clinic)
    #[arg(short = 'C', long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize config directory with a template clinic.toml
    Init,

    /// Show clinic, record counts and the next invoice number
    Status,

    /// List accepted payment modes
    Modes,

    /// Suggest line items from a patient's lab orders and prescriptions
    Billable {
        /// Patient id
        #[arg(short, long)]
        patient: Option<String>,
    },

    /// Create a new invoice for a patient
    Create {
        /// Patient id
        #[arg(short, long)]
        patient: Option<String>,

        /// Line items in format "description:amount" (can be repeated)
        #[arg(short, long, value_name = "DESC:AMOUNT")]
        item: Vec<String>,

        /// Also add the patient's lab orders and prescriptions at zero amount
        #[arg(long)]
        billable: bool,
    },

    /// Replace an invoice's line items
    Edit {
        /// Invoice number, id, or index from 'list' (e.g., 1 or INV-0001)
        invoice: String,

        /// New line items in format "description:amount" (replaces existing items)
        #[arg(short, long, value_name = "DESC:AMOUNT")]
        item: Vec<String>,
    },

    /// List invoices, newest first
    List {
        /// Filter by patient name or invoice number
        #[arg(short, long)]
        search: Option<String>,

        /// today, week, month, quarter, year, all or custom
        #[arg(long)]
        period: Option<String>,

        /// Custom period start (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// Custom period end, inclusive (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,

        /// Number of invoices to show (default: all)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show an invoice with its items and payments
    Show {
        /// Invoice number, id, or index from 'list'
        invoice: String,
    },

    /// Record a payment against an invoice
    Pay {
        /// Invoice number, id, or index from 'list'
        invoice: String,

        /// Payment amount
        amount: String,

        /// Payment mode (see 'clinic modes')
        #[arg(short, long)]
        mode: Option<String>,

        /// Transaction reference, e.g. an M-Pesa code
        #[arg(short, long, default_value = "")]
        reference: String,

        #[arg(short, long, default_value = "")]
        notes: String,
    },

    /// Change a recorded payment
    EditPayment {
        /// Invoice number, id, or index from 'list'
        invoice: String,

        /// Payment id, id prefix, or 1-based index from 'show'
        payment: String,

        #[arg(short, long)]
        amount: Option<String>,

        #[arg(short, long)]
        mode: Option<String>,

        #[arg(short, long)]
        reference: Option<String>,

        #[arg(short, long)]
        notes: Option<String>,
    },

    /// Remove a payment from an invoice
    DeletePayment {
        /// Invoice number, id, or index from 'list'
        invoice: String,

        /// Payment id, id prefix, or 1-based index from 'show'
        payment: String,
    },

    /// Show billing history, for one invoice or all
    History {
        /// Invoice number, id, or index from 'list'
        invoice: Option<String>,
    },

    /// Show the system audit log
    Audit {
        /// Number of entries to show (default: 50)
        #[arg(short, long, default_value_t = 50)]
        limit: usize,
    },

    /// Income report for a period, optionally exported as CSV
    Report {
        /// today, week, month, quarter, year, all or custom
        #[arg(long)]
        period: Option<String>,

        /// Custom period start (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// Custom period end, inclusive (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,

        /// Write the invoice rows to this CSV file
        #[arg(long, value_name = "FILE")]
        csv: Option<PathBuf>,
    },
}

fn main() {
    init_logging();
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

/// Log to stderr, filtered by CLINIC_LOG (default: warn)
fn init_logging() {
    let filter = EnvFilter::try_from_env("CLINIC_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let cfg_dir = match cli.config_dir {
        Some(p) => p,
        None => config_dir()?,
    };

    if let Commands::Init = cli.command {
        return cmd_init(&cfg_dir);
    }

    if !cfg_dir.exists() {
        return Err(BillingError::ConfigNotFound(cfg_dir));
    }
    let config = load_config(&cfg_dir)?;
    let mut store = FileStore::open(records_path(&cfg_dir)).with_quota(config.storage.quota_bytes);
    let mut ledger = Ledger::new(&mut store)
        .with_user(config.billing.user.clone())
        .with_currency(config.billing.currency.clone());

    match cli.command {
        Commands::Init => Err(BillingError::AlreadyInitialized(cfg_dir.clone())),
        Commands::Status => cmd_status(&cfg_dir, &config, &ledger),
        Commands::Modes => cmd_modes(&config),
        Commands::Billable { patient } => cmd_billable(&config, &ledger, patient),
        Commands::Create {
            patient,
            item,
            billable,
        } => cmd_create(&config, &mut ledger, patient, &item, billable),
        Commands::Edit { invoice, item } => cmd_edit(&config, &mut ledger, &invoice, &item),
        Commands::List {
            search,
            period,
            from,
            to,
            limit,
        } => {
            let period = Period::parse(period.as_deref(), from.as_deref(), to.as_deref())?;
            cmd_list(&config, &ledger, search.as_deref(), &period, limit)
        }
        Commands::Show { invoice } => cmd_show(&config, &ledger, &invoice),
        Commands::Pay {
            invoice,
            amount,
            mode,
            reference,
            notes,
        } => cmd_pay(&config, &mut ledger, &invoice, &amount, mode, reference, notes),
        Commands::EditPayment {
            invoice,
            payment,
            amount,
            mode,
            reference,
            notes,
        } => {
            let update = PaymentUpdate {
                amount: amount.as_deref().map(parse_amount).transpose()?,
                mode: mode
                    .map(|m| resolve_payment_mode(Some(m.as_str()), &config.billing.all_payment_modes()))
                    .transpose()?,
                reference,
                notes,
            };
            cmd_edit_payment(&config, &mut ledger, &invoice, &payment, update)
        }
        Commands::DeletePayment { invoice, payment } => {
            cmd_delete_payment(&config, &mut ledger, &invoice, &payment)
        }
        Commands::History { invoice } => cmd_history(&ledger, invoice.as_deref()),
        Commands::Audit { limit } => cmd_audit(&ledger, limit),
        Commands::Report {
            period,
            from,
            to,
            csv,
        } => {
            let period = Period::parse(period.as_deref(), from.as_deref(), to.as_deref())?;
            cmd_report(&config, &ledger, &period, csv.as_deref())
        }
    }
}

/// Initialize config directory with the template file
fn cmd_init(cfg_dir: &Path) -> Result<()> {
    if cfg_dir.exists() {
        return Err(BillingError::AlreadyInitialized(cfg_dir.to_path_buf()));
    }

    fs::create_dir_all(cfg_dir)?;
    fs::write(cfg_dir.join(CONFIG_FILE), CONFIG_TEMPLATE)?;

    println!("Initialized clinic config at: {}", cfg_dir.display());
    println!();
    println!("Next steps:");
    println!(
        "  1. Edit your clinic details:  $EDITOR {}/{}",
        cfg_dir.display(),
        CONFIG_FILE
    );
    println!("  2. Create an invoice:         clinic create --patient <id> --item <desc>:<amount>");
    println!("  3. Record a payment:          clinic pay <invoice> <amount> --mode Cash");

    Ok(())
}

// Table row structs for tabled
#[derive(Tabled)]
struct InvoiceRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "NUMBER")]
    number: String,
    #[tabled(rename = "DATE")]
    date: String,
    #[tabled(rename = "PATIENT")]
    patient: String,
    #[tabled(rename = "TOTAL")]
    total: String,
    #[tabled(rename = "PAID")]
    paid: String,
    #[tabled(rename = "STATUS")]
    status: String,
}

#[derive(Tabled)]
struct ItemRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "DESCRIPTION")]
    description: String,
    #[tabled(rename = "SOURCE")]
    source: String,
    #[tabled(rename = "AMOUNT")]
    amount: String,
}

#[derive(Tabled)]
struct PaymentRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "DATE")]
    date: String,
    #[tabled(rename = "MODE")]
    mode: String,
    #[tabled(rename = "REFERENCE")]
    reference: String,
    #[tabled(rename = "AMOUNT")]
    amount: String,
}

#[derive(Tabled)]
struct HistoryRow {
    #[tabled(rename = "WHEN")]
    when: String,
    #[tabled(rename = "INVOICE")]
    invoice: String,
    #[tabled(rename = "ACTION")]
    action: String,
    #[tabled(rename = "DETAILS")]
    details: String,
    #[tabled(rename = "USER")]
    user: String,
}

#[derive(Tabled)]
struct AuditRow {
    #[tabled(rename = "WHEN")]
    when: String,
    #[tabled(rename = "MODULE")]
    module: String,
    #[tabled(rename = "ACTION")]
    action: String,
    #[tabled(rename = "DETAILS")]
    details: String,
    #[tabled(rename = "USER")]
    user: String,
}

#[derive(Tabled)]
struct ModeRow {
    #[tabled(rename = "MODE")]
    mode: String,
    #[tabled(rename = "AMOUNT")]
    amount: String,
}

fn local_date(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d").to_string()
}

fn local_datetime(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

fn short_id(id: &str) -> String {
    id.chars().take(8).collect()
}

/// Append summary rows under the value column of a rounded table, merging
/// the columns to its left into one label cell and closing off the columns
/// to its right.
fn add_financial_footer(table: &str, value_col: usize, rows: &[(&str, String)]) -> String {
    let lines: Vec<&str> = table.lines().collect();
    if lines.len() < 4 || value_col == 0 {
        return table.to_string();
    }

    // Parse the top border to discover column widths
    let Some(inner) = lines[0].strip_prefix('╭').and_then(|s| s.strip_suffix('╮')) else {
        return table.to_string();
    };

    let widths: Vec<usize> = inner.split('┬').map(|p| p.chars().count()).collect();
    if widths.len() < value_col + 2 {
        return table.to_string();
    }

    let dashes = |cols: &[usize]| {
        cols.iter()
            .map(|w| "─".repeat(*w))
            .collect::<Vec<_>>()
            .join("┴")
    };

    let left_width = widths[..value_col].iter().sum::<usize>() + value_col - 1;
    let value_width = widths[value_col];

    // Strip the original bottom border and start building
    let mut out = lines[..lines.len() - 1].join("\n");
    out.push('\n');

    out.push_str(&format!(
        "├{}┼{}┼{}╯\n",
        dashes(&widths[..value_col]),
        "─".repeat(value_width),
        dashes(&widths[value_col + 1..]),
    ));

    for (idx, (label, value)) in rows.iter().enumerate() {
        out.push_str(&format!(
            "│ {:>left$} │ {:>value$} │\n",
            label,
            value,
            left = left_width - 2,
            value = value_width - 2
        ));
        if idx < rows.len() - 1 {
            out.push_str(&format!(
                "├{}┼{}┤\n",
                "─".repeat(left_width),
                "─".repeat(value_width)
            ));
        }
    }

    out.push_str(&format!(
        "╰{}┴{}╯",
        "─".repeat(left_width),
        "─".repeat(value_width)
    ));

    out
}

/// Newest-first position of an invoice over the whole collection, so the `#`
/// shown by a filtered `list` resolves to the same invoice.
fn list_index(invoices: &[Invoice], invoice_id: &str) -> usize {
    invoices
        .iter()
        .rev()
        .position(|inv| inv.id == invoice_id)
        .map_or(0, |pos| pos + 1)
}

/// Resolve an invoice reference: a 1-based index from 'list' (newest first),
/// an invoice number, or an invoice id.
fn resolve_invoice(ledger: &Ledger<'_, FileStore>, reference: &str) -> Result<Invoice> {
    if let Ok(idx) = reference.parse::<usize>() {
        let invoices = ledger.invoices()?;
        if idx == 0 || idx > invoices.len() {
            return Err(BillingError::InvalidInvoiceIndex(reference.to_string()));
        }
        return Ok(invoices[invoices.len() - idx].clone());
    }
    ledger.find_invoice(reference)
}

fn resolve_payment_id(invoice: &Invoice, reference: &str) -> Result<String> {
    invoice
        .payment_position(reference)
        .map(|pos| invoice.payments[pos].id.clone())
        .ok_or_else(|| BillingError::PaymentNotFound {
            invoice: invoice.invoice_no.clone(),
            payment: reference.to_string(),
        })
}

fn cmd_status(cfg_dir: &Path, config: &Config, ledger: &Ledger<'_, FileStore>) -> Result<()> {
    let invoices = ledger.invoices()?;
    let patients = clinic_billing::records::patients(ledger.store())?;
    let currency = &config.billing.currency;

    println!("Clinic Billing Status");
    println!("{}", "-".repeat(50));
    println!("Config directory: {}", cfg_dir.display());
    println!("Records:          {}", ledger.store().path().display());
    println!("Clinic:           {}", config.clinic.name);
    println!("Patients:         {}", patients.len());
    println!("Invoices:         {}", invoices.len());
    println!("Next invoice:     {}", ledger.next_invoice_no()?);

    if !invoices.is_empty() {
        println!();
        println!("Recent invoices:");
        for inv in invoices.iter().rev().take(5) {
            println!(
                "  {} - {} - {} ({})",
                inv.invoice_no,
                inv.patient_name,
                format_money(inv.total, currency),
                inv.status
            );
        }
    }

    Ok(())
}

fn cmd_modes(config: &Config) -> Result<()> {
    for mode in config.billing.all_payment_modes() {
        println!("{mode}");
    }
    Ok(())
}

fn cmd_billable(config: &Config, ledger: &Ledger<'_, FileStore>, patient_id: Option<String>) -> Result<()> {
    let patient_id = patient_id.ok_or(BillingError::NoPatient)?;
    let patient = find_patient(ledger.store(), &patient_id)?
        .ok_or_else(|| BillingError::PatientNotFound(patient_id.clone()))?;

    let items = ledger.billable_items(&patient.id)?;
    if items.is_empty() {
        println!("No lab orders or prescriptions for {}.", patient.full_name());
        return Ok(());
    }

    println!("Billable items for {}", patient.full_name());
    print_items(config, &items);
    println!("Items already billed on earlier invoices are listed again; check before billing.");
    Ok(())
}

fn print_items(config: &Config, items: &[billing::InvoiceItem]) {
    let rows: Vec<ItemRow> = items
        .iter()
        .enumerate()
        .map(|(idx, item)| ItemRow {
            index: idx + 1,
            description: item.description.clone(),
            source: item.source.clone().unwrap_or_default(),
            amount: format_money(item.amount, &config.billing.currency),
        })
        .collect();
    println!("{}", Table::new(rows).with(Style::rounded()));
}

fn cmd_create(
    config: &Config,
    ledger: &mut Ledger<'_, FileStore>,
    patient_id: Option<String>,
    items_input: &[String],
    with_billable: bool,
) -> Result<()> {
    let patient_id = patient_id.ok_or(BillingError::NoPatient)?;
    let patient = find_patient(ledger.store(), &patient_id)?
        .ok_or_else(|| BillingError::PatientNotFound(patient_id.clone()))?;

    let mut items = if with_billable {
        ledger.billable_items(&patient.id)?
    } else {
        Vec::new()
    };
    if !items_input.is_empty() {
        items.extend(parse_items(items_input)?);
    }
    let items = retain_described(items);
    if items.is_empty() {
        return Err(BillingError::NoItems);
    }

    let invoice = ledger.create_invoice(NewInvoice::issued(&patient.id, patient.full_name(), items))?;

    println!("Created {}", invoice.invoice_no);
    println!("  Patient: {}", invoice.patient_name);
    println!("  Items:   {}", invoice.items.len());
    println!("  Total:   {}", format_money(invoice.total, &config.billing.currency));

    Ok(())
}

fn cmd_edit(
    config: &Config,
    ledger: &mut Ledger<'_, FileStore>,
    invoice_ref: &str,
    items_input: &[String],
) -> Result<()> {
    let items = retain_described(parse_items(items_input)?);
    if items.is_empty() {
        return Err(BillingError::NoItems);
    }

    let invoice = resolve_invoice(ledger, invoice_ref)?;
    let invoice = ledger.update_invoice_items(&invoice.id, items)?;

    println!("Updated {}", invoice.invoice_no);
    println!("  Items:  {}", invoice.items.len());
    println!("  Total:  {}", format_money(invoice.total, &config.billing.currency));
    println!("  Status: {}", invoice.status);

    Ok(())
}

fn cmd_list(
    config: &Config,
    ledger: &Ledger<'_, FileStore>,
    search: Option<&str>,
    period: &Period,
    limit: Option<usize>,
) -> Result<()> {
    let all = ledger.invoices()?;
    if all.is_empty() {
        println!("No invoices created yet.");
        return Ok(());
    }

    let mut shown = filter_invoices(&all, period, search);
    shown.reverse();
    if let Some(n) = limit {
        shown.truncate(n);
    }
    if shown.is_empty() {
        println!("No invoices match the given filters.");
        return Ok(());
    }

    let currency = &config.billing.currency;
    let rows: Vec<InvoiceRow> = shown
        .iter()
        .map(|inv| InvoiceRow {
            index: list_index(&all, &inv.id),
            number: inv.invoice_no.clone(),
            date: local_date(inv.created_at),
            patient: inv.patient_name.clone(),
            total: format_money(inv.total, currency),
            paid: format_money(inv.paid, currency),
            status: inv.status.to_string(),
        })
        .collect();

    let summary = Summary::of(&shown);
    let table = Table::new(rows).with(Style::rounded()).to_string();
    let table = add_financial_footer(
        &table,
        4,
        &[
            ("TOTAL BILLED", format_money(summary.billed, currency)),
            ("(-) PAID", format_money(summary.paid, currency)),
            ("(=) OUTSTANDING", format_money(summary.outstanding, currency)),
        ],
    );

    println!("{table}");
    println!();
    println!("Showing {} of {} invoices ({})", shown.len(), all.len(), period.label());

    Ok(())
}

fn cmd_show(config: &Config, ledger: &Ledger<'_, FileStore>, invoice_ref: &str) -> Result<()> {
    let invoice = resolve_invoice(ledger, invoice_ref)?;
    let currency = &config.billing.currency;
    let clinic = &config.clinic;

    println!("{}", clinic.name);
    for line in [&clinic.trading_name, &clinic.phone, &clinic.email].into_iter().flatten() {
        println!("{line}");
    }
    println!("{}", "-".repeat(50));
    println!("Invoice:  {} ({})", invoice.invoice_no, invoice.status);
    println!("Patient:  {}", invoice.patient_name);
    println!("Date:     {}", local_datetime(invoice.created_at));

    print_items(config, &invoice.items);
    println!("Total:       {}", format_money(invoice.total, currency));

    if invoice.payments.is_empty() {
        println!("No payments recorded.");
    } else {
        let rows: Vec<PaymentRow> = invoice
            .payments
            .iter()
            .enumerate()
            .map(|(idx, p)| PaymentRow {
                index: idx + 1,
                id: short_id(&p.id),
                date: local_date(p.paid_at),
                mode: p.mode.clone(),
                reference: p.reference.clone(),
                amount: format_money(p.amount, currency),
            })
            .collect();
        println!("Payments");
        println!("{}", Table::new(rows).with(Style::rounded()));
    }

    println!("Paid:        {}", format_money(invoice.paid, currency));
    println!("Balance due: {}", format_money(invoice.balance_due(), currency));
    if invoice.status == InvoiceStatus::Overpaid {
        println!("(overpaid by {})", format_money(invoice.paid - invoice.total, currency));
    }
    println!();
    println!("{}", clinic.footer());

    Ok(())
}

fn cmd_pay(
    config: &Config,
    ledger: &mut Ledger<'_, FileStore>,
    invoice_ref: &str,
    amount: &str,
    mode: Option<String>,
    reference: String,
    notes: String,
) -> Result<()> {
    let amount = require_positive(parse_amount(amount)?)?;
    let mode = resolve_payment_mode(mode.as_deref(), &config.billing.all_payment_modes())?;

    let invoice = resolve_invoice(ledger, invoice_ref)?;
    let payment = ledger.add_payment(
        &invoice.id,
        NewPayment {
            amount,
            mode,
            reference,
            notes,
        },
    )?;
    let invoice = ledger.invoice(&invoice.id)?;

    println!(
        "Recorded {} {} payment for {} ({}, {} due)",
        format_money(payment.amount, &config.billing.currency),
        payment.mode,
        invoice.invoice_no,
        invoice.status,
        format_money(invoice.balance_due(), &config.billing.currency)
    );

    Ok(())
}

fn cmd_edit_payment(
    config: &Config,
    ledger: &mut Ledger<'_, FileStore>,
    invoice_ref: &str,
    payment_ref: &str,
    update: PaymentUpdate,
) -> Result<()> {
    if update.is_empty() {
        return Err(BillingError::NoPaymentChanges);
    }

    let invoice = resolve_invoice(ledger, invoice_ref)?;
    let payment_id = resolve_payment_id(&invoice, payment_ref)?;
    let payment = ledger.update_payment(&invoice.id, &payment_id, update)?;
    let invoice = ledger.invoice(&invoice.id)?;

    println!(
        "Updated payment {} on {}: {} via {}",
        short_id(&payment.id),
        invoice.invoice_no,
        format_money(payment.amount, &config.billing.currency),
        payment.mode
    );
    println!(
        "  Paid {} of {} ({})",
        format_money(invoice.paid, &config.billing.currency),
        format_money(invoice.total, &config.billing.currency),
        invoice.status
    );

    Ok(())
}

fn cmd_delete_payment(
    config: &Config,
    ledger: &mut Ledger<'_, FileStore>,
    invoice_ref: &str,
    payment_ref: &str,
) -> Result<()> {
    let invoice = resolve_invoice(ledger, invoice_ref)?;
    let payment_id = resolve_payment_id(&invoice, payment_ref)?;
    let removed = ledger.delete_payment(&invoice.id, &payment_id)?;
    let invoice = ledger.invoice(&invoice.id)?;

    println!(
        "Removed {} payment from {} ({})",
        format_money(removed.amount, &config.billing.currency),
        invoice.invoice_no,
        invoice.status
    );

    Ok(())
}

fn cmd_history(ledger: &Ledger<'_, FileStore>, invoice_ref: Option<&str>) -> Result<()> {
    let entries = match invoice_ref {
        Some(r) => {
            let invoice = resolve_invoice(ledger, r)?;
            ledger.history(Some(&invoice.id))?
        }
        None => ledger.history(None)?,
    };

    if entries.is_empty() {
        println!("No billing history.");
        return Ok(());
    }

    let rows: Vec<HistoryRow> = entries
        .into_iter()
        .map(|h| HistoryRow {
            when: local_datetime(h.timestamp),
            invoice: h.invoice_no,
            action: h.action,
            details: h.details,
            user: h.user,
        })
        .collect();
    println!("{}", Table::new(rows).with(Style::rounded()));

    Ok(())
}

fn cmd_audit(ledger: &Ledger<'_, FileStore>, limit: usize) -> Result<()> {
    let entries = billing::audit::entries(ledger.store())?;
    if entries.is_empty() {
        println!("Audit log is empty.");
        return Ok(());
    }

    let rows: Vec<AuditRow> = entries
        .into_iter()
        .take(limit)
        .map(|a| AuditRow {
            when: local_datetime(a.timestamp),
            module: a.module,
            action: a.action,
            details: a.details,
            user: a.user,
        })
        .collect();
    println!("{}", Table::new(rows).with(Style::rounded()));

    Ok(())
}

fn cmd_report(
    config: &Config,
    ledger: &Ledger<'_, FileStore>,
    period: &Period,
    csv_path: Option<&Path>,
) -> Result<()> {
    let invoices = filter_invoices(&ledger.invoices()?, period, None);
    let summary = Summary::of(&invoices);
    let currency = &config.billing.currency;

    println!("Income Report: {}", period.label());
    println!("{}", "-".repeat(50));
    println!("Invoices:     {}", summary.invoices);
    println!("Total billed: {}", format_money(summary.billed, currency));
    println!("Total paid:   {}", format_money(summary.paid, currency));
    println!("Outstanding:  {}", format_money(summary.outstanding, currency));

    if !summary.by_mode.is_empty() {
        let rows: Vec<ModeRow> = summary
            .by_mode
            .iter()
            .map(|m| ModeRow {
                mode: m.mode.clone(),
                amount: format_money(m.amount, currency),
            })
            .collect();
        println!();
        println!("Income by payment mode");
        println!("{}", Table::new(rows).with(Style::rounded()));
    }

    if let Some(path) = csv_path {
        let file = fs::File::create(path)?;
        write_invoices_csv(file, &invoices)?;
        println!();
        println!("Exported {} invoices to {}", invoices.len(), path.display());
    }

    Ok(())
}
