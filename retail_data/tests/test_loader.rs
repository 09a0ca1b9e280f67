use retail_data::{load_market, load_sales, load_stores, DataError, StoreType};
use std::io::Write;
use tempfile::NamedTempFile;

fn write_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

#[test]
fn sales_rows_parse_with_booleans_as_written() {
    let file = write_file(
        "Store,Dept,Date,Weekly_Sales,IsHoliday\n\
         1,1,2010-02-05,24924.5,FALSE\n\
         1,1,2010-02-12,46039.49,TRUE\n",
    );
    let rows = load_sales(file.path()).unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].store, 1);
    assert_eq!(rows[0].weekly_sales, 24924.5);
    assert!(!rows[0].is_holiday);
    assert!(rows[1].is_holiday);
    assert_eq!(rows[1].date.to_string(), "2010-02-12");
}

#[test]
fn market_rows_treat_na_as_missing() {
    let file = write_file(
        "Store,Date,Temperature,Fuel_Price,MarkDown1,MarkDown2,MarkDown3,MarkDown4,MarkDown5,CPI,Unemployment,IsHoliday\n\
         1,2010-02-05,42.31,2.572,NA,NA,NA,NA,NA,211.096358,8.106,FALSE\n\
         1,2010-02-12,38.51,2.548,150.5,,NA,12.0,NA,211.24,8.106,TRUE\n",
    );
    let rows = load_market(file.path()).unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].markdowns(), [None; 5]);
    assert_eq!(rows[0].cpi, Some(211.096358));
    assert_eq!(rows[1].markdown1, Some(150.5));
    assert_eq!(rows[1].markdown2, None);
    assert_eq!(rows[1].markdown4, Some(12.0));
}

#[test]
fn store_rows_parse_type_letters() {
    let file = write_file(
        "Store,Type,Size\n\
         1,A,151315\n\
         2,B,202307\n\
         3,C,37392\n",
    );
    let rows = load_stores(file.path()).unwrap();

    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].store_type, StoreType::A);
    assert_eq!(rows[1].store_type, StoreType::B);
    assert_eq!(rows[2].size, 37392);
}

#[test]
fn headers_are_matched_case_insensitively() {
    let file = write_file(
        "store,dept,date,weekly_sales,isholiday\n\
         4,9,2011-03-04,1000.25,true\n",
    );
    let rows = load_sales(file.path()).unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].store, 4);
    assert_eq!(rows[0].dept, 9);
    assert!(rows[0].is_holiday);
}

#[test]
fn missing_file_is_an_io_error() {
    let result = load_sales("/nonexistent/train.csv");
    assert!(matches!(result, Err(DataError::Io(_))));
}

#[test]
fn malformed_rows_are_a_csv_error() {
    let file = write_file(
        "Store,Dept,Date,Weekly_Sales,IsHoliday\n\
         1,1,not-a-date,10.0,FALSE\n",
    );
    let result = load_sales(file.path());
    assert!(matches!(result, Err(DataError::Csv(_))));
}
