//! Форма пациента: значения по умолчанию, проверка и HTML

use serde::{Deserialize, Serialize};

use crate::error::{MlError, Result};
use crate::labels::{
    choice_label, Choice, BINARY_CHOICES, DISCLAIMER, FREQUENCY_CHOICES, GENDER_CHOICES,
    TRANSPORT_CHOICES,
};
use crate::types::{AdviceKind, PatientRecord, PredictionOutput};

/// Поля формы. Значения - исходные ключи датасета ("yes", "Male", ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientForm {
    #[serde(rename = "Gender")]
    pub gender: String,
    #[serde(rename = "Age")]
    pub age: f64,
    #[serde(rename = "Height")]
    pub height: f64,
    #[serde(rename = "Weight")]
    pub weight: f64,
    #[serde(rename = "family_history_with_overweight", alias = "family_history")]
    pub family_history: String,
    #[serde(rename = "FAVC")]
    pub favc: String,
    #[serde(rename = "FCVC")]
    pub fcvc: f64,
    #[serde(rename = "NCP")]
    pub ncp: f64,
    #[serde(rename = "CAEC")]
    pub caec: String,
    #[serde(rename = "SMOKE")]
    pub smoke: String,
    #[serde(rename = "CH2O")]
    pub ch2o: f64,
    #[serde(rename = "SCC")]
    pub scc: String,
    #[serde(rename = "FAF")]
    pub faf: f64,
    #[serde(rename = "TUE")]
    pub tue: f64,
    #[serde(rename = "CALC")]
    pub calc: String,
    #[serde(rename = "MTRANS")]
    pub mtrans: String,
}

impl Default for PatientForm {
    fn default() -> Self {
        Self {
            gender: "Male".to_string(),
            age: 25.0,
            height: 1.70,
            weight: 70.0,
            family_history: "yes".to_string(),
            favc: "yes".to_string(),
            fcvc: 2.0,
            ncp: 3.0,
            caec: "Sometimes".to_string(),
            smoke: "no".to_string(),
            ch2o: 2.0,
            scc: "no".to_string(),
            faf: 1.0,
            tue: 1.0,
            calc: "no".to_string(),
            mtrans: "Public_Transportation".to_string(),
        }
    }
}

struct Range {
    field: &'static str,
    label: &'static str,
    min: f64,
    max: f64,
    step: f64,
}

const AGE: Range = Range { field: "Age", label: "Idade", min: 14.0, max: 100.0, step: 1.0 };
const HEIGHT: Range = Range { field: "Height", label: "Altura (m)", min: 1.40, max: 2.50, step: 0.01 };
const WEIGHT: Range = Range { field: "Weight", label: "Peso (kg)", min: 30.0, max: 300.0, step: 0.1 };
const FCVC: Range = Range { field: "FCVC", label: "Frequência de consumo de vegetais (1-3)", min: 1.0, max: 3.0, step: 0.1 };
const NCP: Range = Range { field: "NCP", label: "Número de refeições principais (1-4)", min: 1.0, max: 4.0, step: 0.1 };
const CH2O: Range = Range { field: "CH2O", label: "Consumo diário de água (1-3)", min: 1.0, max: 3.0, step: 0.1 };
const FAF: Range = Range { field: "FAF", label: "Frequência de atividade física (0-3)", min: 0.0, max: 3.0, step: 0.1 };
const TUE: Range = Range { field: "TUE", label: "Tempo de uso de eletrônicos (0-2)", min: 0.0, max: 2.0, step: 0.1 };

fn check_range(range: &Range, value: f64) -> Result<f64> {
    if value.is_finite() && value >= range.min && value <= range.max {
        Ok(value)
    } else {
        Err(MlError::InvalidInput(format!(
            "{} must be between {} and {}, got {}",
            range.field, range.min, range.max, value
        )))
    }
}

fn check_choice(field: &str, choices: &[Choice], value: &str) -> Result<Option<String>> {
    if choice_label(choices, value).is_some() {
        Ok(Some(value.to_string()))
    } else {
        Err(MlError::InvalidInput(format!("{field}: unexpected value '{value}'")))
    }
}

impl PatientForm {
    /// Проверка диапазонов и словарей, как в виджетах формы.
    pub fn validate(&self) -> Result<PatientRecord> {
        Ok(PatientRecord {
            gender: check_choice("Gender", &GENDER_CHOICES, &self.gender)?,
            age: Some(check_range(&AGE, self.age)?),
            height: Some(check_range(&HEIGHT, self.height)?),
            weight: Some(check_range(&WEIGHT, self.weight)?),
            family_history: check_choice(
                "family_history_with_overweight",
                &BINARY_CHOICES,
                &self.family_history,
            )?,
            favc: check_choice("FAVC", &BINARY_CHOICES, &self.favc)?,
            fcvc: Some(check_range(&FCVC, self.fcvc)?),
            ncp: Some(check_range(&NCP, self.ncp)?),
            caec: check_choice("CAEC", &FREQUENCY_CHOICES, &self.caec)?,
            smoke: check_choice("SMOKE", &BINARY_CHOICES, &self.smoke)?,
            ch2o: Some(check_range(&CH2O, self.ch2o)?),
            scc: check_choice("SCC", &BINARY_CHOICES, &self.scc)?,
            faf: Some(check_range(&FAF, self.faf)?),
            tue: Some(check_range(&TUE, self.tue)?),
            calc: check_choice("CALC", &FREQUENCY_CHOICES, &self.calc)?,
            mtrans: check_choice("MTRANS", &TRANSPORT_CHOICES, &self.mtrans)?,
        })
    }

    /// Пары (колонка, значение) для таблицы "Resumo dos Dados".
    pub fn summary(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Gender", self.gender.clone()),
            ("Age", format!("{}", self.age)),
            ("Height", format!("{:.2}", self.height)),
            ("Weight", format!("{:.1}", self.weight)),
            ("family_history_with_overweight", self.family_history.clone()),
            ("FAVC", self.favc.clone()),
            ("FCVC", format!("{:.1}", self.fcvc)),
            ("NCP", format!("{:.1}", self.ncp)),
            ("CAEC", self.caec.clone()),
            ("SMOKE", self.smoke.clone()),
            ("CH2O", format!("{:.1}", self.ch2o)),
            ("SCC", self.scc.clone()),
            ("FAF", format!("{:.1}", self.faf)),
            ("TUE", format!("{:.1}", self.tue)),
            ("CALC", self.calc.clone()),
            ("MTRANS", self.mtrans.clone()),
        ]
    }
}

/// Что показать в блоке результата.
#[derive(Debug, Clone)]
pub enum Notice {
    Prediction(PredictionOutput),
    InvalidInput(String),
    ModelUnavailable(String),
    Failure(String),
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn select(field: &str, label: &str, choices: &[Choice], selected: &str) -> String {
    let options: String = choices
        .iter()
        .map(|(key, text)| {
            format!(
                r#"<option value="{key}"{sel}>{text}</option>"#,
                sel = if *key == selected { " selected" } else { "" }
            )
        })
        .collect();
    format!(r#"<label for="{field}">{label}</label><select id="{field}" name="{field}">{options}</select>"#)
}

fn number(range: &Range, value: f64) -> String {
    format!(
        r#"<label for="{f}">{l}</label><input type="number" id="{f}" name="{f}" min="{min}" max="{max}" step="{step}" value="{value}">"#,
        f = range.field,
        l = range.label,
        min = range.min,
        max = range.max,
        step = range.step,
    )
}

fn slider(range: &Range, value: f64) -> String {
    format!(
        r#"<label for="{f}">{l}: <output>{value:.1}</output></label><input type="range" id="{f}" name="{f}" min="{min}" max="{max}" step="{step}" value="{value}" oninput="this.previousElementSibling.firstElementChild.value=Number(this.value).toFixed(1)">"#,
        f = range.field,
        l = range.label,
        min = range.min,
        max = range.max,
        step = range.step,
    )
}

fn sidebar(form: &PatientForm) -> String {
    let fields = [
        "<h3>Biometria</h3>".to_string(),
        select("Gender", "Gênero", &GENDER_CHOICES, &form.gender),
        number(&AGE, form.age),
        number(&HEIGHT, form.height),
        number(&WEIGHT, form.weight),
        "<h3>Hábitos Alimentares</h3>".to_string(),
        select(
            "family_history_with_overweight",
            "Histórico Familiar de Sobrepeso?",
            &BINARY_CHOICES,
            &form.family_history,
        ),
        select("FAVC", "Consumo frequente de alimentos calóricos?", &BINARY_CHOICES, &form.favc),
        select("CAEC", "Consumo de alimentos entre refeições", &FREQUENCY_CHOICES, &form.caec),
        slider(&FCVC, form.fcvc),
        slider(&NCP, form.ncp),
        select("CALC", "Consumo de álcool", &FREQUENCY_CHOICES, &form.calc),
        "<h3>Estilo de Vida</h3>".to_string(),
        select("SMOKE", "Fumante?", &BINARY_CHOICES, &form.smoke),
        slider(&CH2O, form.ch2o),
        select("SCC", "Monitora ingestão calórica?", &BINARY_CHOICES, &form.scc),
        slider(&FAF, form.faf),
        slider(&TUE, form.tue),
        select("MTRANS", "Meio de transporte habitual", &TRANSPORT_CHOICES, &form.mtrans),
    ];

    format!(
        r#"<aside><form method="post" action="/predict"><h2>📋 Dados do Paciente</h2>{}<button type="submit">Realizar Predição</button></form></aside>"#,
        fields.concat()
    )
}

fn summary_table(form: &PatientForm) -> String {
    let rows: String = form
        .summary()
        .into_iter()
        .map(|(name, value)| format!("<tr><th>{name}</th><td>{}</td></tr>", escape_html(&value)))
        .collect();
    format!(r#"<table class="summary"><thead><tr><th></th><th>Valor</th></tr></thead><tbody>{rows}</tbody></table>"#)
}

fn notice_block(notice: &Notice) -> String {
    match notice {
        Notice::Prediction(output) => {
            let class = match output.advice.kind {
                AdviceKind::Warning => "warning",
                AdviceKind::Info => "info",
                AdviceKind::Normal => "normal",
            };
            format!(
                r#"<div class="success">Nível de Obesidade Previsto: <strong>{}</strong></div><div class="info"><strong>{}</strong></div><div class="{class}">{}</div>"#,
                escape_html(&output.display_label),
                DISCLAIMER,
                escape_html(&output.advice.message),
            )
        }
        Notice::InvalidInput(message) => {
            format!(r#"<div class="error">Dados inválidos: {}</div>"#, escape_html(message))
        }
        Notice::ModelUnavailable(message) => format!(
            r#"<div class="error">Erro ao carregar modelos: {}. Certifique-se de que o treinamento foi realizado.</div>"#,
            escape_html(message)
        ),
        Notice::Failure(message) => {
            format!(r#"<div class="error">Erro na predição: {}</div>"#, escape_html(message))
        }
    }
}

const STYLE: &str = "body{font-family:sans-serif;margin:0;display:flex;flex-direction:column}\
header{padding:1rem 2rem;background:#f0f2f6}\
.layout{display:flex}\
aside{width:320px;padding:1rem;background:#f7f7f9}\
aside label{display:block;margin-top:.6rem;font-size:.9rem}\
aside input,aside select{width:100%}\
aside button{margin-top:1rem;width:100%;padding:.5rem}\
main{flex:1;display:flex;gap:2rem;padding:1rem 2rem}\
main section{flex:1}\
table.summary th{text-align:left;padding-right:1rem}\
.success{background:#d4edda;padding:.8rem;margin:.5rem 0}\
.info{background:#d1ecf1;padding:.8rem;margin:.5rem 0}\
.warning{background:#fff3cd;padding:.8rem;margin:.5rem 0}\
.normal{background:#e2e3e5;padding:.8rem;margin:.5rem 0}\
.error{background:#f8d7da;padding:.8rem;margin:.5rem 0}";

pub fn render_page(form: &PatientForm, notice: Option<&Notice>) -> String {
    let result = notice.map(notice_block).unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="pt-BR">
<head>
<meta charset="utf-8">
<title>Diagnóstico de Obesidade</title>
<style>{STYLE}</style>
</head>
<body>
<header>
<h1>🩺 Sistema de Apoio ao Diagnóstico de Obesidade</h1>
<p>Esta ferramenta auxilia profissionais de saúde na classificação do nível de obesidade com base em parâmetros biométricos e comportamentais.</p>
</header>
<div class="layout">
{sidebar}
<main>
<section><h2>Resumo dos Dados</h2>{summary}</section>
<section><h2>Resultado da Análise</h2>{result}</section>
</main>
</div>
</body>
</html>"#,
        sidebar = sidebar(form),
        summary = summary_table(form),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let record = PatientForm::default().validate().unwrap();
        assert_eq!(record.age, Some(25.0));
        assert_eq!(record.caec.as_deref(), Some("Sometimes"));
        assert_eq!(record.calc.as_deref(), Some("no"));
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let form = PatientForm {
            height: 2.8,
            ..PatientForm::default()
        };
        let err = form.validate().unwrap_err();
        assert!(err.to_string().contains("Height"));

        let form = PatientForm {
            age: f64::NAN,
            ..PatientForm::default()
        };
        assert!(form.validate().is_err());
    }

    #[test]
    fn unknown_choices_are_rejected() {
        let form = PatientForm {
            mtrans: "Rocket".to_string(),
            ..PatientForm::default()
        };
        assert!(matches!(form.validate(), Err(MlError::InvalidInput(_))));
    }

    #[test]
    fn page_marks_selected_options_and_escapes_messages() {
        let form = PatientForm {
            gender: "Female".to_string(),
            ..PatientForm::default()
        };
        let html = render_page(&form, Some(&Notice::Failure("<boom>".to_string())));

        assert!(html.contains(r#"<option value="Female" selected>Feminino</option>"#));
        assert!(html.contains("&lt;boom&gt;"));
        assert!(html.contains("Realizar Predição"));
    }
}
