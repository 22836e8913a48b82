//! Словари отображения для интерфейса (pt-BR)

use crate::types::{Advice, AdviceKind, ObesityLevel};

/// Вариант выбора в форме: ключ, уходящий в модель, и подпись.
pub type Choice = (&'static str, &'static str);

pub const BINARY_CHOICES: [Choice; 2] = [("yes", "Sim"), ("no", "Não")];

pub const GENDER_CHOICES: [Choice; 2] = [("Male", "Masculino"), ("Female", "Feminino")];

pub const FREQUENCY_CHOICES: [Choice; 4] = [
    ("no", "Nunca"),
    ("Sometimes", "Às vezes"),
    ("Frequently", "Frequentemente"),
    ("Always", "Sempre"),
];

pub const TRANSPORT_CHOICES: [Choice; 5] = [
    ("Public_Transportation", "Transporte Público"),
    ("Walking", "Caminhada"),
    ("Automobile", "Automóvel"),
    ("Motorbike", "Motocicleta"),
    ("Bike", "Bicicleta"),
];

pub fn level_label(level: ObesityLevel) -> &'static str {
    match level {
        ObesityLevel::InsufficientWeight => "Abaixo do peso",
        ObesityLevel::NormalWeight => "Peso normal",
        ObesityLevel::OverweightLevelI => "Sobrepeso (Grau I)",
        ObesityLevel::OverweightLevelII => "Sobrepeso (Grau II)",
        ObesityLevel::ObesityTypeI => "Obesidade Grau I",
        ObesityLevel::ObesityTypeII => "Obesidade Grau II",
        ObesityLevel::ObesityTypeIII => "Obesidade Grau III",
    }
}

/// Подпись для сырой метки модели. Неизвестные метки показываются как есть.
pub fn display_label(raw: &str) -> String {
    raw.parse::<ObesityLevel>()
        .map(|level| level_label(level).to_string())
        .unwrap_or_else(|_| raw.to_string())
}

pub fn choice_label(choices: &[Choice], key: &str) -> Option<&'static str> {
    choices.iter().find(|(k, _)| *k == key).map(|(_, label)| *label)
}

pub fn advice_for(raw: &str) -> Advice {
    if raw.contains("Obesity") {
        Advice {
            kind: AdviceKind::Warning,
            message: "Atenção: O perfil indica necessidade de intervenção clínica e nutricional."
                .to_string(),
        }
    } else if raw.contains("Overweight") {
        Advice {
            kind: AdviceKind::Info,
            message: "O perfil indica tendência ao sobrepeso. Recomenda-se monitoramento de hábitos."
                .to_string(),
        }
    } else {
        Advice {
            kind: AdviceKind::Normal,
            message: "O perfil está dentro dos parâmetros de normalidade ou abaixo do peso."
                .to_string(),
        }
    }
}

pub const DISCLAIMER: &str = "Nota Importante: Este resultado é gerado por um modelo estatístico e deve ser \
interpretado por um profissional de saúde qualificado como parte de uma avaliação clínica completa.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_levels_are_translated() {
        assert_eq!(display_label("Obesity_Type_II"), "Obesidade Grau II");
        assert_eq!(display_label("Normal_Weight"), "Peso normal");
    }

    #[test]
    fn unknown_labels_pass_through() {
        assert_eq!(display_label("Something_Else"), "Something_Else");
    }

    #[test]
    fn advice_follows_label_family() {
        assert_eq!(advice_for("Obesity_Type_I").kind, AdviceKind::Warning);
        assert_eq!(advice_for("Overweight_Level_II").kind, AdviceKind::Info);
        assert_eq!(advice_for("Insufficient_Weight").kind, AdviceKind::Normal);
    }

    #[test]
    fn choice_lookup() {
        assert_eq!(choice_label(&TRANSPORT_CHOICES, "Bike"), Some("Bicicleta"));
        assert_eq!(choice_label(&BINARY_CHOICES, "maybe"), None);
    }
}
