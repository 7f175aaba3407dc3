use crate::types::CRITERIA_COUNT;

/// A scoring criterion. Position in [`CRITERIA`] is the index into
/// `Service::scores`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Criterion {
    pub id: &'static str,
    pub short_title: &'static str,
    pub title: &'static str,
    /// Column holding this score in the spreadsheet row.
    pub sheet_column: &'static str,
    pub sub_criteria: &'static [&'static str],
}

pub const CRITERIA: [Criterion; CRITERIA_COUNT] = [
    Criterion {
        id: "alinhamento",
        short_title: "Alinhamento",
        title: "Alinhamento Estratégico",
        sheet_column: "score_alinhamento",
        sub_criteria: &[
            "Conexão com o core business e a marca.",
            "Aproveita canais e competências existentes.",
        ],
    },
    Criterion {
        id: "valor-cliente",
        short_title: "Valor Cliente",
        title: "Valor para o Cliente",
        sheet_column: "score_valor_cliente",
        sub_criteria: &[
            "Intensidade da dor resolvida.",
            "Frequência de uso e percepção de valor.",
        ],
    },
    Criterion {
        id: "impacto-financeiro",
        short_title: "Impacto Fin.",
        title: "Impacto Financeiro",
        sheet_column: "score_impacto_fin",
        sub_criteria: &[
            "Potencial de receita e margem.",
            "Recorrência e previsibilidade do faturamento.",
        ],
    },
    Criterion {
        id: "viabilidade",
        short_title: "Viabilidade",
        title: "Viabilidade de Implementação",
        sheet_column: "score_viabilidade",
        sub_criteria: &[
            "Complexidade operacional e de parceiros.",
            "Investimento inicial e prazo de lançamento.",
        ],
    },
    Criterion {
        id: "vantagem-competitiva",
        short_title: "Vantagem Comp.",
        title: "Vantagem Competitiva",
        sheet_column: "score_vantagem_comp",
        sub_criteria: &[
            "Diferenciação frente a concorrentes.",
            "Dificuldade de cópia.",
        ],
    },
];

/// Index of a criterion by id or short title.
pub fn criterion_index(key: &str) -> Option<usize> {
    CRITERIA
        .iter()
        .position(|c| c.id == key || c.short_title.eq_ignore_ascii_case(key))
}
