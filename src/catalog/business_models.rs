use std::fmt;

use serde::{Deserialize, Serialize};

use crate::helpers::fold_key;

/// One of the six canonical monetization models ideas are grouped into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BusinessModelCategory {
    #[serde(rename = "Assinatura/Recorrência")]
    Subscription,
    #[serde(rename = "Pacote de Serviço")]
    ServicePackage,
    #[serde(rename = "Locação")]
    Leasing,
    #[serde(rename = "Consultoria")]
    Consulting,
    #[serde(rename = "Soluções B2B")]
    B2bSolutions,
    #[serde(rename = "Financeiro/Benefício")]
    FinancialBenefit,
}

impl BusinessModelCategory {
    pub const ALL: [BusinessModelCategory; 6] = [
        BusinessModelCategory::Subscription,
        BusinessModelCategory::ServicePackage,
        BusinessModelCategory::Leasing,
        BusinessModelCategory::Consulting,
        BusinessModelCategory::B2bSolutions,
        BusinessModelCategory::FinancialBenefit,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            BusinessModelCategory::Subscription => "assinatura-recorrencia",
            BusinessModelCategory::ServicePackage => "pacote-de-servico",
            BusinessModelCategory::Leasing => "locacao",
            BusinessModelCategory::Consulting => "consultoria",
            BusinessModelCategory::B2bSolutions => "solucoes-b2b",
            BusinessModelCategory::FinancialBenefit => "financeiro-beneficio",
        }
    }

    /// Label used in charts and as the value offered in the creation form.
    pub fn short_title(&self) -> &'static str {
        match self {
            BusinessModelCategory::Subscription => "Assinatura/Recorrência",
            BusinessModelCategory::ServicePackage => "Pacote de Serviço",
            BusinessModelCategory::Leasing => "Locação",
            BusinessModelCategory::Consulting => "Consultoria",
            BusinessModelCategory::B2bSolutions => "Soluções B2B",
            BusinessModelCategory::FinancialBenefit => "Financeiro/Benefício",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            BusinessModelCategory::Subscription => "Assinatura & Recorrência",
            BusinessModelCategory::ServicePackage => "Pacote de Serviço (One-Time)",
            BusinessModelCategory::Leasing => "Locação & Acesso (Leasing)",
            BusinessModelCategory::Consulting => "Consultoria & Serviço Especializado",
            BusinessModelCategory::B2bSolutions => "Soluções B2B (Business-to-Business)",
            BusinessModelCategory::FinancialBenefit => "Serviços Financeiros & Benefícios",
        }
    }

    /// Resolve a category from its id, short title or title.
    pub fn from_label(label: &str) -> Option<Self> {
        let key = fold_key(label);
        Self::ALL.into_iter().find(|c| {
            fold_key(c.id()) == key || fold_key(c.short_title()) == key || fold_key(c.title()) == key
        })
    }
}

impl fmt::Display for BusinessModelCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_title())
    }
}

/// Raw values seen on records that do not match a category label directly.
/// Keys are compared after [`fold_key`].
const RAW_MODEL_TABLE: &[(&str, BusinessModelCategory)] = &[
    ("assinatura", BusinessModelCategory::Subscription),
    ("recorrencia", BusinessModelCategory::Subscription),
    ("assinatura & recorrencia", BusinessModelCategory::Subscription),
    ("mensalidade", BusinessModelCategory::Subscription),
    ("clube de assinatura", BusinessModelCategory::Subscription),
    ("saas", BusinessModelCategory::Subscription),
    ("subscription", BusinessModelCategory::Subscription),
    ("pacote", BusinessModelCategory::ServicePackage),
    ("pacote de servicos", BusinessModelCategory::ServicePackage),
    ("servico avulso", BusinessModelCategory::ServicePackage),
    ("one-time", BusinessModelCategory::ServicePackage),
    ("instalacao", BusinessModelCategory::ServicePackage),
    ("preco fixo", BusinessModelCategory::ServicePackage),
    ("aluguel", BusinessModelCategory::Leasing),
    ("locacao & acesso", BusinessModelCategory::Leasing),
    ("leasing", BusinessModelCategory::Leasing),
    ("product-as-a-service", BusinessModelCategory::Leasing),
    ("paas", BusinessModelCategory::Leasing),
    ("consultoria especializada", BusinessModelCategory::Consulting),
    ("servico especializado", BusinessModelCategory::Consulting),
    ("curadoria", BusinessModelCategory::Consulting),
    ("consulting", BusinessModelCategory::Consulting),
    ("b2b", BusinessModelCategory::B2bSolutions),
    ("b2b2c", BusinessModelCategory::B2bSolutions),
    ("solucoes corporativas", BusinessModelCategory::B2bSolutions),
    ("corporativo", BusinessModelCategory::B2bSolutions),
    ("financeiro", BusinessModelCategory::FinancialBenefit),
    ("beneficio", BusinessModelCategory::FinancialBenefit),
    ("servicos financeiros", BusinessModelCategory::FinancialBenefit),
    ("seguro", BusinessModelCategory::FinancialBenefit),
    ("garantia estendida", BusinessModelCategory::FinancialBenefit),
    ("credito", BusinessModelCategory::FinancialBenefit),
    ("consorcio", BusinessModelCategory::FinancialBenefit),
    ("cashback", BusinessModelCategory::FinancialBenefit),
    ("programa de fidelidade", BusinessModelCategory::FinancialBenefit),
];

/// Default category for raw values nobody recognizes.
pub const DEFAULT_CATEGORY: BusinessModelCategory = BusinessModelCategory::ServicePackage;

/// Total mapping from raw business-model strings to canonical categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusinessModelMapper {
    fallback: BusinessModelCategory,
}

impl Default for BusinessModelMapper {
    fn default() -> Self {
        Self {
            fallback: DEFAULT_CATEGORY,
        }
    }
}

impl BusinessModelMapper {
    pub fn with_fallback(fallback: BusinessModelCategory) -> Self {
        Self { fallback }
    }

    pub fn fallback(&self) -> BusinessModelCategory {
        self.fallback
    }

    /// Never fails: unknown values resolve to the fallback category.
    pub fn map(&self, raw: &str) -> BusinessModelCategory {
        if let Some(category) = BusinessModelCategory::from_label(raw) {
            return category;
        }
        let key = fold_key(raw);
        RAW_MODEL_TABLE
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, category)| *category)
            .unwrap_or(self.fallback)
    }
}

/// Map with the default fallback.
pub fn map_business_model(raw: &str) -> BusinessModelCategory {
    BusinessModelMapper::default().map(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_labels_map_to_themselves() {
        for category in BusinessModelCategory::ALL {
            assert_eq!(map_business_model(category.short_title()), category);
            assert_eq!(map_business_model(category.id()), category);
            assert_eq!(map_business_model(category.title()), category);
        }
    }

    #[test]
    fn raw_variants_are_normalized() {
        assert_eq!(map_business_model("  ALUGUEL "), BusinessModelCategory::Leasing);
        assert_eq!(map_business_model("Crédito"), BusinessModelCategory::FinancialBenefit);
        assert_eq!(map_business_model("B2B2C"), BusinessModelCategory::B2bSolutions);
        assert_eq!(map_business_model("Mensalidade"), BusinessModelCategory::Subscription);
    }

    #[test]
    fn unknown_values_fall_back() {
        assert_eq!(map_business_model("Escambo intergaláctico"), DEFAULT_CATEGORY);
        assert_eq!(map_business_model(""), DEFAULT_CATEGORY);

        let mapper = BusinessModelMapper::with_fallback(BusinessModelCategory::Consulting);
        assert_eq!(mapper.map("???"), BusinessModelCategory::Consulting);
        assert_eq!(mapper.map("Locação"), BusinessModelCategory::Leasing);
    }

    #[test]
    fn table_keys_are_already_folded() {
        for (key, _) in RAW_MODEL_TABLE {
            assert_eq!(fold_key(key), *key);
        }
    }
}
