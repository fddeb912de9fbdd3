//! Static schemas for the four logical data tables
//!
//! Column order is a compatibility contract with the prebuilt template: each
//! list must exactly match the table header order in the workbook, so fields
//! are never reordered or renamed without also updating the template.

/// Document row where table data starts. Row 1 is the header, which lives in
/// the template and is never rewritten.
pub const DATA_START_ROW: u32 = 2;

/// The four data tables the engine knows how to rewrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableKind {
    Scenario,
    Lines,
    SubLines,
    FundSources,
}

impl TableKind {
    /// Processing order for a full report render.
    pub const ALL: [TableKind; 4] = [
        TableKind::Scenario,
        TableKind::Lines,
        TableKind::SubLines,
        TableKind::FundSources,
    ];

    /// Worksheet name used to locate the table inside the workbook.
    pub fn sheet_name(self) -> &'static str {
        match self {
            TableKind::Scenario => "Data_Scenario",
            TableKind::Lines => "Data_Lines",
            TableKind::SubLines => "Data_Sub_Lines",
            TableKind::FundSources => "Data_Fund-Sources",
        }
    }

    /// Ordered column schema (template header order).
    pub fn fields(self) -> &'static [&'static str] {
        match self {
            TableKind::Scenario => SCENARIO_FIELDS,
            TableKind::Lines => LINES_FIELDS,
            TableKind::SubLines => SUBLINES_FIELDS,
            TableKind::FundSources => FUNDSOURCES_FIELDS,
        }
    }

    /// Columns rendered as numeric cells when their value parses as a number.
    /// Everything else is written as literal text.
    pub fn numeric_fields(self) -> &'static [&'static str] {
        match self {
            TableKind::Scenario => SCENARIO_NUMERIC,
            TableKind::Lines => LINES_NUMERIC,
            TableKind::SubLines => SUBLINES_NUMERIC,
            TableKind::FundSources => FUNDSOURCES_NUMERIC,
        }
    }

    pub fn is_numeric(self, field: &str) -> bool {
        self.numeric_fields().contains(&field)
    }
}

const SCENARIO_FIELDS: &[&str] = &[
    "Name",
    "Appr Type",
    "Status",
    "Component",
    "Appropriation Type (from Component)",
    "1000 Expenditures",
    "2000 Expenditures",
    "3000 Expenditures",
    "4000 Expenditures",
    "5000 Expenditures",
    "Final Notes",
    "Fiscal Year 2",
    "Month 2",
    "Actuals Date (from Month 2)",
    "Personal Services Projection Description",
    "Projection Mode",
    "Created By",
    "Created Time",
];

const SCENARIO_NUMERIC: &[&str] = &[
    "1000 Expenditures",
    "2000 Expenditures",
    "3000 Expenditures",
    "4000 Expenditures",
    "5000 Expenditures",
];

const LINES_FIELDS: &[&str] = &[
    "Name",
    "Projection Type",
    "Object Class (from Object Class)",
    "Obj. Type (from Object Class)",
    "Obj. Group (from Object Class)",
    "Object Class with Name",
    "Personal Services?",
    "Pre-Encumbrance",
    "Encumbrance",
    "Expenditure",
    "Expected Expenditures",
    "Total Expenditures",
    "Total Plan (Manual)",
    "Expected Expenditures (Calc)",
    "Notes",
    "RSA Budget",
    "Program Code",
    "RSA Description",
    "PY Actuals",
];

const LINES_NUMERIC: &[&str] = &[
    "Pre-Encumbrance",
    "Encumbrance",
    "Expenditure",
    "Expected Expenditures",
    "Total Expenditures",
    "Total Plan (Manual)",
    "Expected Expenditures (Calc)",
    "RSA Budget",
    "PY Actuals",
];

const SUBLINES_FIELDS: &[&str] = &[
    "Name",
    "Projection Lines",
    "Object Class",
    "Pre-Encumbrances",
    "Encumbrances",
    "Expenditures",
    "Projected Expenditures",
    "Total Projected Spend",
    "Notes",
    "District Note",
    "Total Plan (Manual)",
    "Projected Expenditures (Calc)",
    "Total Expenditures (Calc)",
];

const SUBLINES_NUMERIC: &[&str] = &[
    "Pre-Encumbrances",
    "Encumbrances",
    "Expenditures",
    "Projected Expenditures",
    "Total Projected Spend",
    "Total Plan (Manual)",
    "Projected Expenditures (Calc)",
    "Total Expenditures (Calc)",
];

const FUNDSOURCES_FIELDS: &[&str] = &[
    "Appr Unit",
    "Fund",
    "Expected Revenue",
    "1000",
    "2000",
    "3000",
    "4000",
    "5000",
    "Total Expenditures",
    "Balance",
    "1000 Exp Budget",
    "2000 Exp Budget",
    "3000 Exp Budget",
    "4000 Exp Budget",
    "5000 Exp Budget",
    "1000 Pending Budget Changes",
    "2000 Pending Budget Changes",
    "3000 Pending Budget Changes",
    "4000 Pending Budget Changes",
    "5000 Pending Budget Changes",
    "1000 Balance",
    "2000 Balance",
    "3000 Balance",
    "4000 Balance",
    "5000 Balance",
    "Support Lines Total Budget",
    "Support Lines Balance",
    "Support Lines Expenditures",
    "Expenditure Budget",
    "Budget Change Notes",
    "Balance (Exp Budget)",
];

const FUNDSOURCES_NUMERIC: &[&str] = &[
    "Expected Revenue",
    "1000",
    "2000",
    "3000",
    "4000",
    "5000",
    "Total Expenditures",
    "Balance",
    "1000 Exp Budget",
    "2000 Exp Budget",
    "3000 Exp Budget",
    "4000 Exp Budget",
    "5000 Exp Budget",
    "1000 Pending Budget Changes",
    "2000 Pending Budget Changes",
    "3000 Pending Budget Changes",
    "4000 Pending Budget Changes",
    "5000 Pending Budget Changes",
    "1000 Balance",
    "2000 Balance",
    "3000 Balance",
    "4000 Balance",
    "5000 Balance",
    "Support Lines Total Budget",
    "Support Lines Balance",
    "Support Lines Expenditures",
    "Expenditure Budget",
    "Balance (Exp Budget)",
];
