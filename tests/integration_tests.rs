use chrono::NaiveDate;
use dealer_reports::*;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

const METADATA: &str = "Dealer Code,Dealer Name,Tally Name(Dealer Name),TSE Name,Type,Count of RA
D1,Alpha Mobiles,ALPHA MOBILES,Ravi,RA,2
D2,Beta Telecom,BETA TELECOM,Meena,Non-RA,
D3,Gamma Store,GAMMA STORE,,RA,1
";

const PRICES: &str = "Material Code,NLC
M1,200
M2,150
";

const INVENTORY: &str = "Material Code,Dealer Code,Dealer Name,SPU Name,Color,SKU Spec,Product Type
M1,D1,Alpha Mobiles,realme C63,Blue,8+128,mobile phone
M1,D1,Alpha Mobiles,realme C63,Blue,8+128,mobile phone
M2,D1,Alpha Mobiles,realme C61,Red,4+64,mobile phone
M9,D2,Beta Telecom,realme GT 6T,Black,8+256,mobile phone
";

const BILLS: &str = "Date,Ref. No.,Party's Name,Pending Amount,Due on,Overdue by days
01-Oct-24,INV-101,ALPHA MOBILES,400,08-Oct-24,3
15-Aug-24,INV-77,ALPHA MOBILES,\"1,000.00\",22-Aug-24,40
30-Sep-24,INV-95,BETA TELECOM,100,07-Oct-24,10
20-Sep-24,INV-90,GAMMA STORE,50,27-Sep-24,18
09-Oct-24,INV-110,UNKNOWN SHOP,20,16-Oct-24,2
09-Oct-24,INV-111,BETA TELECOM,pending,16-Oct-24,2
";

/// A scratch data directory laid out the way `InputFiles::under` expects.
struct Fixture {
    root: PathBuf,
}

impl Fixture {
    fn new(name: &str) -> Self {
        let root = std::env::temp_dir().join(format!(
            "dealer-reports-{}-{}",
            name,
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&root);
        fs::create_dir_all(&root).unwrap();

        let fixture = Self { root };
        fixture.write("common/Retailer Metadata.csv", METADATA);
        fixture.write("common/ProductPriceList.csv", PRICES);
        fixture.write("cogs_report/DealerInventory.csv", INVENTORY);
        fixture.write("credit_report/Bills.csv", BILLS);
        fixture
    }

    fn write(&self, relative: &str, contents: &str) {
        let path = self.root.join("data").join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn config(&self) -> ReportConfig {
        ReportConfig {
            output_dir: self.root.join("out"),
            ..ReportConfig::with_data_dir(self.root.join("data"))
        }
    }
}

impl Drop for Fixture {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.root);
    }
}

fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 10, 10).unwrap()
}

fn read_output(output: &ReportOutput, file_name: &str) -> anyhow::Result<Sheet> {
    let path = output.directory.join(file_name);
    anyhow::ensure!(
        output.files.contains(&path),
        "{} was not written",
        path.display()
    );
    Ok(Sheet::from_path(&path, 0)?)
}

fn column(sheet: &Sheet, name: &str) -> Vec<String> {
    (0..sheet.len())
        .map(|row| sheet.cell(row, name).unwrap_or_default().to_string())
        .collect()
}

fn file_names(output: &ReportOutput) -> Vec<String> {
    output
        .files
        .iter()
        .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .collect()
}

#[test]
fn test_credit_report_split_by_tse() -> anyhow::Result<()> {
    let fixture = Fixture::new("credit");
    let output = run_report("credit", &fixture.config(), as_of())?;

    assert_eq!(
        output.directory,
        fixture.root.join("out").join("credit_reports_2024-10-10")
    );
    assert_eq!(
        file_names(&output),
        vec![
            "Meena_credit_report.csv",
            "Ravi_credit_report.csv",
            "TSE_MISSING_credit_report.csv",
        ]
    );

    let ravi = read_output(&output, "Ravi_credit_report.csv")?;
    assert_eq!(column(&ravi, "Retailer Code"), vec!["D1", "Total"]);
    assert_eq!(ravi.cell(0, "0-7 Days"), Some("400.00"));
    assert_eq!(ravi.cell(0, "31+ Days"), Some("1000.00"));
    assert_eq!(ravi.cell(0, "Total Credit"), Some("1400.00"));
    assert_eq!(ravi.cell(0, "Total Inventory Cost"), Some("550.00"));
    assert_eq!(ravi.cell(0, "Inventory Shortfall"), Some("-850.00"));

    let meena = read_output(&output, "Meena_credit_report.csv")?;
    assert_eq!(meena.cell(0, "8-14 Days"), Some("100.00"));
    assert_eq!(meena.cell(0, "Total Credit"), Some("100.00"));

    let missing = read_output(&output, "TSE_MISSING_credit_report.csv")?;
    assert_eq!(
        column(&missing, "Retailer Name"),
        vec!["GAMMA STORE", "UNKNOWN SHOP", ""]
    );
    assert_eq!(missing.cell(0, "15-20 Days"), Some("50.00"));
    assert_eq!(missing.cell(0, "Inventory Shortfall"), Some("-50.00"));
    assert_eq!(missing.cell(2, "Total Credit"), Some("70.00"));
    Ok(())
}

#[test]
fn test_credit_report_keeps_tses_whose_file_names_collide() -> anyhow::Result<()> {
    let fixture = Fixture::new("credit-collision");
    fixture.write(
        "common/Retailer Metadata.csv",
        "Dealer Code,Dealer Name,Tally Name(Dealer Name),TSE Name,Type,Count of RA
D1,Alpha Mobiles,ALPHA MOBILES,Ravi K,RA,2
D2,Beta Telecom,BETA TELECOM,Ravi_K,Non-RA,
D3,Gamma Store,GAMMA STORE,,RA,1
",
    );
    let output = run_report("credit", &fixture.config(), as_of())?;

    assert_eq!(
        file_names(&output),
        vec![
            "Ravi_K_credit_report.csv",
            "Ravi_K_credit_report_2.csv",
            "TSE_MISSING_credit_report.csv",
        ]
    );
    let spaced = read_output(&output, "Ravi_K_credit_report.csv")?;
    assert_eq!(column(&spaced, "TSE"), vec!["Ravi K", ""]);
    let underscored = read_output(&output, "Ravi_K_credit_report_2.csv")?;
    assert_eq!(column(&underscored, "Retailer Code"), vec!["D2", "Total"]);
    assert_eq!(underscored.cell(0, "TSE"), Some("Ravi_K"));
    Ok(())
}

#[test]
fn test_inventory_cost_report_reads_todays_credit() -> anyhow::Result<()> {
    let fixture = Fixture::new("cogs");
    let config = fixture.config();

    run_report("credit", &config, as_of())?;
    let output = run_report("cogs", &config, as_of())?;
    let sheet = read_output(&output, "inventory_cost_report.csv")?;

    assert_eq!(column(&sheet, "Dealer Code"), vec!["D2", "D1"]);
    assert_eq!(column(&sheet, "TSE"), vec!["Meena", "Ravi"]);
    assert_eq!(
        column(&sheet, "Total Inventory Cost"),
        vec!["0.00", "550.00"]
    );
    assert_eq!(column(&sheet, "Total Credit Due"), vec!["100.00", "1400.00"]);
    assert_eq!(
        column(&sheet, "Inventory Shortfall"),
        vec!["-100.00", "-850.00"]
    );
    Ok(())
}

#[test]
fn test_inventory_cost_report_without_credit_reports() -> anyhow::Result<()> {
    let fixture = Fixture::new("cogs-no-credit");
    let output = run_report("cogs", &fixture.config(), as_of())?;
    let sheet = read_output(&output, "inventory_cost_report.csv")?;

    assert_eq!(column(&sheet, "Total Credit Due"), vec!["0.00", "0.00"]);
    assert_eq!(sheet.cell(1, "Inventory Shortfall"), Some("550.00"));
    Ok(())
}

#[test]
fn test_growth_report() -> anyhow::Result<()> {
    let fixture = Fixture::new("growth");
    fixture.write(
        "growth_report/MTD-SO.csv",
        "Dealer Code,Dealer Name,Activate Time
D1,Alpha Mobiles,2024-10-01 10:00:00
D1,Alpha Mobiles,2024-10-05 12:30:00
D1,Alpha Mobiles,2024-10-10 18:00:00
D1,Alpha Mobiles,2024-10-11 09:00:00
D2,Beta Telecom,2024-10-02 11:00:00
",
    );
    fixture.write(
        "growth_report/LMTD-SO.csv",
        "toDealerCode,toDealerName,activateTime
D1,Alpha Mobiles,2024-09-02 10:00:00
D1,Alpha Mobiles,2024-09-09 10:00:00
D1,Alpha Mobiles,2024-09-20 10:00:00
",
    );
    fixture.write(
        "growth_report/MTD-ST.csv",
        "Dealer Code,Dealer Name,Activate Time
D1,Alpha Mobiles,2024-10-03 10:00:00
D3,Gamma Store,2024-10-03 10:00:00
",
    );
    fixture.write(
        "growth_report/LMTD-ST.csv",
        "Dealer Code,Dealer Name,Activate Time
D1,Alpha Mobiles,2024-09-03 10:00:00
D1,Alpha Mobiles,2024-09-04 10:00:00
",
    );

    let output = run_report("growth", &fixture.config(), as_of())?;
    let sheet = read_output(&output, "sales_growth_report.csv")?;

    assert_eq!(column(&sheet, "Dealer Code"), vec!["D2", "D1"]);
    assert_eq!(column(&sheet, "MTD SO"), vec!["1", "3"]);
    assert_eq!(column(&sheet, "LMTD SO"), vec!["0", "2"]);
    assert_eq!(column(&sheet, "Growth SO %"), vec!["100.00", "50.00"]);
    assert_eq!(column(&sheet, "Growth ST %"), vec!["0.00", "-50.00"]);
    Ok(())
}

#[test]
fn test_ra_norms_report() -> anyhow::Result<()> {
    let fixture = Fixture::new("ranorms");
    let config = ReportConfig {
        ra_models: vec!["C63".to_string(), "C61".to_string()],
        ..fixture.config()
    };

    let output = run_report("ranorms", &config, as_of())?;
    let sheet = read_output(&output, "ra_norms_report.csv")?;

    assert_eq!(
        sheet.headers(),
        &["TSE", "Dealer Name", "C61", "C63", "Total Refill"]
    );
    assert_eq!(column(&sheet, "Dealer Name"), vec!["Gamma Store", "Alpha Mobiles"]);
    assert_eq!(column(&sheet, "C61"), vec!["3", "5"]);
    assert_eq!(column(&sheet, "C63"), vec!["3", "4"]);
    assert_eq!(column(&sheet, "Total Refill"), vec!["6", "9"]);
    Ok(())
}

#[test]
fn test_zso_report() -> anyhow::Result<()> {
    let fixture = Fixture::new("zso");
    fixture.write(
        "growth_report/L2M-SO.csv",
        "SPU Name,Dealer Code,Dealer Name,Product Type,Activate Time
realme C63,D1,Alpha Mobiles,mobile phone,2024-09-12 10:00:00
realme P1 5G,D1,Alpha Mobiles,mobile phone,2024-09-13 10:00:00
realme P1 5G,D1,Alpha Mobiles,mobile phone,2024-10-01 10:00:00
realme GT 6T,D2,Beta Telecom,mobile phone,2024-09-20 10:00:00
realme C61,D2,Beta Telecom,mobile phone,2024-10-02 10:00:00
realme Buds T300,D2,Beta Telecom,accessories,2024-10-02 10:00:00
",
    );

    let output = run_report("zso", &fixture.config(), as_of())?;
    let sheet = read_output(&output, "zso_report.csv")?;

    assert_eq!(
        sheet.headers(),
        &["TSE", "Dealer Name", "C61", "P1 5G", "Total ZSO"]
    );
    assert_eq!(column(&sheet, "Dealer Name"), vec!["Beta Telecom", "Alpha Mobiles"]);
    assert_eq!(column(&sheet, "C61"), vec!["ZSO", ""]);
    assert_eq!(column(&sheet, "P1 5G"), vec!["", "ZSO"]);
    assert_eq!(column(&sheet, "Total ZSO"), vec!["1", "1"]);
    Ok(())
}

#[test]
fn test_sales_target_report() -> anyhow::Result<()> {
    let fixture = Fixture::new("salestarget");
    fixture.write(
        "sales_report/Sales.csv",
        "Viking Distributors
Sales Register
1-Oct-24 to 10-Oct-24
Page 1
Company GSTIN
Printed on 10-Oct-24
Branch Main
Ledger All
Voucher Sales
Retailer Code,Party Name,Amount ,Item Name
D1,Alpha Mobiles,\"15,000.00\",SMART PHONE C63
D1,Alpha Mobiles,12000,SMART PHONE C61
D2,Beta Telecom,999,realme Buds T300
Retailer Code,Party Name,Amount ,Item Name
,Cash Sale,500,SMART PHONE C61
",
    );

    let mut smart_targets = BTreeMap::new();
    smart_targets.insert("Ravi".to_string(), 10);
    let mut config = fixture.config();
    config.sales_target.targets = [(SalesCategory::SmartPhones, smart_targets)]
        .into_iter()
        .collect();

    let output = run_report("salestarget", &config, as_of())?;
    assert_eq!(output.files.len(), 6);

    let targets = read_output(&output, "smart_phones_targets.csv")?;
    assert_eq!(column(&targets, "TSE"), vec!["Ravi"]);
    assert_eq!(targets.cell(0, "Achieved"), Some("2"));
    assert_eq!(targets.cell(0, "Balance"), Some("8"));
    assert_eq!(targets.cell(0, "Balance %"), Some("80.00"));

    let sales = read_output(&output, "smart_phones_sales.csv")?;
    assert_eq!(column(&sales, "Dealer Code"), vec!["D1", "Total"]);
    assert_eq!(column(&sales, "Total Sales Value"), vec!["27000.00", "27000.00"]);

    let accessories = read_output(&output, "accessories_sales.csv")?;
    assert_eq!(column(&accessories, "Sell Out"), vec!["1", "1"]);
    assert_eq!(accessories.cell(0, "TSE"), Some("Meena"));
    Ok(())
}

#[test]
fn test_missing_column_aborts_without_output() {
    let fixture = Fixture::new("missing-column");
    fixture.write(
        "credit_report/Bills.csv",
        "Date,Ref. No.,Party Name,Pending Amount,Due on,Overdue by days\n",
    );
    let config = fixture.config();

    let err = run_report("credit", &config, as_of()).unwrap_err();
    assert!(matches!(
        err,
        ReportError::MissingColumn { ref column, .. } if column == "Party's Name"
    ));
    assert!(!Path::new(&config.output_dir).exists());
}

#[test]
fn test_unknown_report_name() {
    let config = ReportConfig::default();
    let err = run_report("pricelist", &config, as_of()).unwrap_err();
    assert!(matches!(err, ReportError::UnknownReport(_)));
}

#[test]
fn test_schema_generation() {
    let schema = ReportConfig::schema_as_json().unwrap();
    assert!(schema.contains("refill_multiplier"));
    assert!(schema.contains("sales_target"));
}
