use std::fs;

use proventos::models::dividend::{DividendRecord, COLUMNS};
use proventos::services::charts::{ChartSink, LineChart, TerminalChartSink};
use proventos::services::errors::ProventosError;
use proventos::services::parsers::DecimalConvention;
use proventos::services::pipeline::{Pipeline, PipelineContext};
use proventos::services::sinks::{CsvTableSink, TableSink};
use rust_decimal_macros::dec;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpListener,
};

#[derive(Default)]
struct RecordingTable {
    writes: Vec<Vec<DividendRecord>>,
}

impl TableSink for RecordingTable {
    fn write_table(&mut self, records: &[DividendRecord]) -> Result<(), ProventosError> {
        self.writes.push(records.to_vec());
        Ok(())
    }
}

#[derive(Default)]
struct RecordingCharts {
    charts: Vec<LineChart>,
}

impl ChartSink for RecordingCharts {
    fn render(&mut self, chart: &LineChart) -> Result<(), ProventosError> {
        self.charts.push(chart.clone());
        Ok(())
    }
}

const HEADER: &str = "<thead><tr><th>Data</th><th>Valor</th><th>Tipo</th>\
    <th>Data de Pagamento</th><th>Por quantas ações</th></tr></thead>";

fn row(record_date: &str, value: &str, kind: &str, payment_date: &str, quantity: &str) -> String {
    format!(
        "<tr><td>{record_date}</td><td>{value}</td><td>{kind}</td>\
         <td>{payment_date}</td><td>{quantity}</td></tr>"
    )
}

fn page(rows: &[String]) -> String {
    format!(
        "<html><head><title>Proventos</title></head><body>\
         <table id=\"resultado\">{HEADER}<tbody>{}</tbody></table></body></html>",
        rows.concat()
    )
}

fn sample_page() -> String {
    page(&[
        row("12/11/2021", "0,2512", "dividendo", "30/11/2021", "1"),
        row("20/05/2020", "1.234,50", "JRS CAP PROPRIO", "10/06/2020", "100"),
        row("01/12/2020", "0,10", "dividendo", "-", "1"),
        row("15/02/2020", "0,50", "Dividendo", "28/02/2020", "1"),
    ])
}

fn context(dir: &tempfile::TempDir) -> PipelineContext {
    PipelineContext::new("bbse3", dir.path().join("proventos.csv")).unwrap()
}

#[test]
fn full_run_exports_and_charts() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(&dir);
    let out = ctx.output_path.clone();
    let mut table = CsvTableSink::new(&out);
    let mut charts = RecordingCharts::default();

    let summary = Pipeline::new(ctx, &mut table, &mut charts)
        .process_page(&sample_page())
        .unwrap();

    assert!(summary.table_found);
    assert_eq!(summary.records.len(), 3);
    assert_eq!(summary.report.placeholder_rows_dropped, 1);
    assert!(summary.records.iter().all(|r| r.ticker == "BBSE3"));
    assert!(summary
        .records
        .iter()
        .all(|r| r.payment_type == r.payment_type.to_uppercase()));

    let content = fs::read_to_string(&out).unwrap();
    let mut lines = content.lines();
    assert_eq!(lines.next().unwrap(), COLUMNS.join(";"));
    assert_eq!(lines.next().unwrap(), "BBSE3;2021-11-12;2021-11-30;0.2512;DIVIDENDO");
    assert_eq!(lines.next().unwrap(), "BBSE3;2020-05-20;2020-06-10;12.345;JRS CAP PROPRIO");
    assert_eq!(lines.next().unwrap(), "BBSE3;2020-02-15;2020-02-28;0.5;DIVIDENDO");
    assert_eq!(lines.next(), None);

    assert_eq!(charts.charts.len(), 2);
    assert_eq!(charts.charts[0].title, "PROVENTOS RECEBIDOS POR BBSE3");
    assert_eq!(charts.charts[0].series[0].points.len(), 3);

    let annual = &charts.charts[1];
    assert_eq!(annual.title, "PROVENTOS ANUAIS RECEBIDOS POR BBSE3");
    let years: Vec<&str> = annual.series[0].points.iter().map(|p| p.x.as_str()).collect();
    assert_eq!(years, vec!["2020"]);
    assert_eq!(annual.series[0].points[0].y, dec!(12.845));
    assert_eq!(summary.charted_annual_total, dec!(12.845));
}

#[test]
fn page_without_table_is_a_no_op() {
    let dir = tempfile::tempdir().unwrap();
    let mut table = RecordingTable::default();
    let mut charts = RecordingCharts::default();

    let summary = Pipeline::new(context(&dir), &mut table, &mut charts)
        .process_page("<html><body>Nenhum provento para este ativo</body></html>")
        .unwrap();

    assert!(!summary.table_found);
    assert!(summary.records.is_empty());
    assert!(table.writes.is_empty());
    assert!(charts.charts.is_empty());
}

#[test]
fn zero_quantity_aborts_before_any_output() {
    let dir = tempfile::tempdir().unwrap();
    let mut table = RecordingTable::default();
    let mut charts = RecordingCharts::default();
    let html = page(&[
        row("15/02/2020", "0,50", "DIVIDENDO", "28/02/2020", "1"),
        row("20/05/2020", "1,00", "DIVIDENDO", "10/06/2020", "0"),
    ]);

    let err = Pipeline::new(context(&dir), &mut table, &mut charts)
        .process_page(&html)
        .unwrap_err();

    assert!(matches!(err, ProventosError::ZeroQuantity { row: 2, .. }));
    assert!(table.writes.is_empty());
    assert!(charts.charts.is_empty());
}

#[test]
fn changed_layout_fails_loudly() {
    let dir = tempfile::tempdir().unwrap();
    let mut table = RecordingTable::default();
    let mut charts = RecordingCharts::default();
    let html = "<table><thead><tr><th>Data</th><th>Valor</th><th>Tipo</th>\
        <th>Por quantas ações</th><th>Data de Pagamento</th></tr></thead>\
        <tbody><tr><td>15/02/2020</td><td>0,50</td><td>DIVIDENDO</td>\
        <td>1</td><td>28/02/2020</td></tr></tbody></table>";

    let err = Pipeline::new(context(&dir), &mut table, &mut charts)
        .process_page(html)
        .unwrap_err();

    assert!(matches!(
        err,
        ProventosError::LayoutMismatch {
            position: 3,
            field: "payment_date",
            ..
        }
    ));
    assert!(table.writes.is_empty());
}

#[test]
fn decimal_comma_only_rejects_grouped_values() {
    let dir = tempfile::tempdir().unwrap();
    let mut table = RecordingTable::default();
    let mut charts = RecordingCharts::default();
    let ctx = context(&dir).with_decimal_convention(DecimalConvention::DecimalCommaOnly);

    let err = Pipeline::new(ctx, &mut table, &mut charts)
        .process_page(&sample_page())
        .unwrap_err();

    match err {
        ProventosError::InvalidValue { row, raw, convention } => {
            assert_eq!(row, 2);
            assert_eq!(raw, "1.234,50");
            assert_eq!(convention, DecimalConvention::DecimalCommaOnly);
        }
        other => panic!("expected invalid value, got {other:?}"),
    }
}

#[test]
fn only_placeholder_rows_still_exports_a_header() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(&dir);
    let out = ctx.output_path.clone();
    let mut table = CsvTableSink::new(&out);
    let mut charts = TerminalChartSink::new(Vec::new()).plain();
    let html = page(&[row("01/12/2020", "0,10", "DIVIDENDO", "-", "")]);

    let summary = {
        let mut pipeline = Pipeline::new(ctx, &mut table, &mut charts);
        pipeline.process_page(&html).unwrap()
    };

    assert!(summary.table_found);
    assert!(summary.records.is_empty());
    assert_eq!(fs::read_to_string(&out).unwrap().lines().count(), 1);
    let drawn = String::from_utf8(charts.into_inner()).unwrap();
    assert!(drawn.contains("PROVENTOS RECEBIDOS POR BBSE3"));
    assert!(drawn.contains("(no data)"));
}

#[tokio::test]
async fn latin1_page_is_decoded_by_its_declared_charset() {
    let html = page(&[row("15/02/2020", "0,50", "Dividendo", "28/02/2020", "1")]);
    let body: Vec<u8> = html.chars().map(|c| c as u32 as u8).collect();
    let mut response = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: text/html; charset=ISO-8859-1\r\n\
         Content-Length: {}\r\nConnection: close\r\n\r\n",
        body.len()
    )
    .into_bytes();
    response.extend_from_slice(&body);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }
        socket.write_all(&response).await.unwrap();
        socket.shutdown().await.unwrap();
    });

    let dir = tempfile::tempdir().unwrap();
    let mut ctx = context(&dir);
    ctx.base_url = format!("http://{addr}/proventos.php");
    let mut table = RecordingTable::default();
    let mut charts = RecordingCharts::default();

    let summary = Pipeline::new(ctx, &mut table, &mut charts)
        .run()
        .await
        .unwrap();
    server.await.unwrap();

    assert!(summary.table_found);
    assert_eq!(summary.records.len(), 1);
    assert_eq!(summary.records[0].value_per_share, dec!(0.5));
    assert_eq!(table.writes.len(), 1);
}
