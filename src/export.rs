//! CSV export of the full portfolio.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::catalog::CRITERIA;
use crate::error::PortfolioError;
use crate::types::Service;

const FILE_PREFIX: &str = "portfolio_servicos";

/// `portfolio_servicos_<YYYY-MM-DD>.csv`
pub fn export_file_name(date: NaiveDate) -> String {
    format!("{}_{}.csv", FILE_PREFIX, date.format("%Y-%m-%d"))
}

fn header() -> Vec<&'static str> {
    let mut columns = vec![
        "ID",
        "Serviço",
        "Necessidade",
        "Público-alvo",
        "Cluster",
        "Modelo de Negócio",
        "Status",
        "Criador",
        "Data de Criação",
    ];
    columns.extend(CRITERIA.iter().map(|c| c.short_title));
    columns.extend(["Receita Estimada", "Pontuação Total", "Classificação"]);
    columns
}

fn record(s: &Service) -> Vec<String> {
    let mut fields = vec![
        s.id.to_string(),
        s.service.clone(),
        s.need.clone(),
        s.target_audience.clone(),
        s.cluster.clone(),
        s.business_model.clone(),
        s.status.as_str().to_string(),
        s.creator_name.clone().unwrap_or_default(),
        s.creation_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
    ];
    fields.extend(s.scores.iter().map(|v| v.to_string()));
    fields.push(format!("{:.2}", s.revenue_estimate));
    fields.push(s.total().to_string());
    fields.push(s.tier().label().to_string());
    fields
}

/// Write one header row and one row per record, in collection order.
pub fn write_csv<W: Write>(services: &[Service], writer: W) -> Result<(), PortfolioError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(header())?;
    for service in services {
        wtr.write_record(record(service))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn to_csv_string(services: &[Service]) -> Result<String, PortfolioError> {
    let mut buf = Vec::new();
    write_csv(services, &mut buf)?;
    String::from_utf8(buf).map_err(|e| PortfolioError::Io(e.to_string()))
}

/// Write the export into `dir` under the dated file name and return its path.
pub fn export_to_dir(
    services: &[Service],
    dir: &Path,
    date: NaiveDate,
) -> Result<PathBuf, PortfolioError> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(export_file_name(date));
    let file = std::fs::File::create(&path)?;
    write_csv(services, file)?;
    log::info!("Exported {} services to {}", services.len(), path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Scores, ServiceStatus};
    use chrono::TimeZone;

    fn service(id: i64, name: &str, scores: [i64; 5]) -> Service {
        Service {
            id,
            service: name.to_string(),
            need: "Conforto".to_string(),
            target_audience: "Famílias".to_string(),
            cluster: "Casa Inteligente".to_string(),
            business_model: "Assinatura".to_string(),
            status: ServiceStatus::Approved,
            creator_name: Some("Ana".to_string()),
            creation_date: Some(chrono::Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap()),
            scores: Scores::new(scores),
            revenue_estimate: 1500.0,
        }
    }

    #[test]
    fn file_name_is_dated() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 9).unwrap();
        assert_eq!(export_file_name(date), "portfolio_servicos_2024-02-09.csv");
    }

    #[test]
    fn one_row_per_record_with_derived_columns() {
        let services = vec![
            service(1, "Automação, iluminação", [5, 5, 4, 4, 4]),
            service(2, "Check-up", [1, 1, 1, 1, 1]),
        ];
        let csv = to_csv_string(&services).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("ID,Serviço,"));
        assert!(lines[0].ends_with("Receita Estimada,Pontuação Total,Classificação"));
        assert_eq!(
            lines[1],
            "1,\"Automação, iluminação\",Conforto,Famílias,Casa Inteligente,Assinatura,aprovada,Ana,2024-01-15,5,5,4,4,4,1500.00,22,Altíssima"
        );
        assert!(lines[2].ends_with(",5,Baixa"));
    }

    #[test]
    fn empty_collection_writes_header_only() {
        let csv = to_csv_string(&[]).unwrap();
        assert_eq!(csv.lines().count(), 1);
    }

    #[test]
    fn export_to_dir_writes_named_file() {
        let dir = tempfile::tempdir().unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
        let path = export_to_dir(&[service(1, "A", [2, 2, 2, 2, 2])], dir.path(), date).unwrap();

        assert!(path.ends_with("portfolio_servicos_2024-06-30.csv"));
        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.contains(",10,Baixa"));
    }
}
