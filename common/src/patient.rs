//! 患者データの型定義
//!
//! スプレッドシートの1行を、列名で引く緩い辞書ではなく
//! 明示的なOptionフィールドを持つレコードとして扱う。
//! 空欄・NaN・列なしはすべて `None`。

use crate::error::{Error, Result};
use crate::numeric::format_decimal;

/// セル値
#[derive(Debug, Clone, Default, PartialEq)]
pub enum CellValue {
    #[default]
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
}

impl CellValue {
    /// 空欄・空白のみ・NaNは空とみなす
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Number(n) => n.is_nan(),
            CellValue::Text(s) => s.trim().is_empty(),
            CellValue::Bool(_) => false,
        }
    }

    /// 数値として読む（数値文字列も許容）
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) if !n.is_nan() => Some(*n),
            CellValue::Text(s) => s.trim().parse::<f64>().ok().filter(|n| !n.is_nan()),
            _ => None,
        }
    }

    /// 文字列として読む
    ///
    /// 整数値の数値セルは小数点なしで返す（患者IDなど）。
    pub fn as_text(&self) -> Option<String> {
        if self.is_blank() {
            return None;
        }
        match self {
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                Some(format!("{}", *n as i64))
            }
            CellValue::Number(n) => Some(format_decimal(*n)),
            CellValue::Text(s) => Some(s.trim().to_string()),
            CellValue::Bool(b) => Some(b.to_string()),
            CellValue::Empty => None,
        }
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Text(s) => write!(f, "{}", s),
            CellValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// 入力列
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    DoctorName,
    PatientName,
    PatientId,
    LensFactor,
    AConstant,
    AxialLength,
    MeasuredK1,
    MeasuredK2,
    OpticalAcd,
    Refraction,
    IolPower,
}

impl Column {
    pub const ALL: [Column; 11] = [
        Column::DoctorName,
        Column::PatientName,
        Column::PatientId,
        Column::LensFactor,
        Column::AConstant,
        Column::AxialLength,
        Column::MeasuredK1,
        Column::MeasuredK2,
        Column::OpticalAcd,
        Column::Refraction,
        Column::IolPower,
    ];

    /// 正式な列名
    pub fn canonical(&self) -> &'static str {
        match self {
            Column::DoctorName => "DoctorName",
            Column::PatientName => "PatientName",
            Column::PatientId => "PatientID",
            Column::LensFactor => "LensFactor",
            Column::AConstant => "AConstant",
            Column::AxialLength => "AxialLength_R",
            Column::MeasuredK1 => "MeasuredK1_R",
            Column::MeasuredK2 => "MeasuredK2_R",
            Column::OpticalAcd => "OpticalACD_R",
            Column::Refraction => "Refraction_R",
            Column::IolPower => "IOLPower",
        }
    }

    /// 旧形式（空白区切り）の列名
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Column::DoctorName => &["Doctor Name"],
            Column::PatientName => &["Patient Name"],
            Column::PatientId => &["Patient ID"],
            Column::LensFactor => &["Lens Factor"],
            Column::AConstant => &["A Constant"],
            Column::AxialLength => &["Axial Length"],
            Column::MeasuredK1 => &["Measured K1"],
            Column::MeasuredK2 => &["Measured K2"],
            Column::OpticalAcd => &["Optical ACD"],
            Column::Refraction => &[],
            Column::IolPower => &["IOL Power"],
        }
    }

    /// 旧形式のシートでのみ使う列名
    ///
    /// "Refraction" は正式形式では出力列名なので、旧形式と判定したときだけ入力列とみなす。
    pub fn legacy_aliases(&self) -> &'static [&'static str] {
        match self {
            Column::Refraction => &["Refraction"],
            _ => &[],
        }
    }

    /// ヘッダー行から列位置を探す（正式名を優先、大文字小文字と前後空白は無視）
    pub fn locate(&self, headers: &[String]) -> Option<usize> {
        find_header(headers, self.canonical())
            .or_else(|| self.aliases().iter().find_map(|a| find_header(headers, a)))
    }
}

fn find_header(headers: &[String], name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(name))
}

/// ヘッダー行から求めた列位置
#[derive(Debug, Clone, Default)]
pub struct ColumnMap {
    positions: Vec<(Column, usize)>,
    legacy: bool,
}

impl ColumnMap {
    /// 正式名が1つもなく旧形式の列名だけで解決できたシートは旧形式として扱う
    pub fn from_headers(headers: &[String]) -> Self {
        let mut positions = Vec::new();
        let mut canonical_hits = 0;
        let mut alias_hits = 0;

        for col in Column::ALL {
            if let Some(pos) = find_header(headers, col.canonical()) {
                canonical_hits += 1;
                positions.push((col, pos));
            } else if let Some(pos) = col.aliases().iter().find_map(|a| find_header(headers, a)) {
                alias_hits += 1;
                positions.push((col, pos));
            }
        }

        let legacy = canonical_hits == 0 && alias_hits > 0;
        if legacy {
            for col in Column::ALL {
                if positions.iter().any(|(c, _)| *c == col) {
                    continue;
                }
                if let Some(pos) = col.legacy_aliases().iter().find_map(|a| find_header(headers, a)) {
                    positions.push((col, pos));
                }
            }
        }

        Self { positions, legacy }
    }

    pub fn is_legacy(&self) -> bool {
        self.legacy
    }

    /// 入力列として使われている位置か
    pub fn is_input_position(&self, pos: usize) -> bool {
        self.positions.iter().any(|(_, p)| *p == pos)
    }

    pub fn position(&self, column: Column) -> Option<usize> {
        self.positions
            .iter()
            .find(|(c, _)| *c == column)
            .map(|(_, pos)| *pos)
    }

    /// 必須列の位置（なければ `MissingColumn`）
    pub fn require(&self, column: Column) -> Result<usize> {
        self.position(column)
            .ok_or_else(|| Error::MissingColumn(column.canonical().to_string()))
    }

    /// 見つからなかった列
    pub fn missing(&self) -> Vec<Column> {
        Column::ALL
            .iter()
            .filter(|col| self.position(**col).is_none())
            .copied()
            .collect()
    }
}

/// 患者1行分のデータ
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatientRecord {
    pub doctor_name: Option<String>,
    pub patient_name: Option<String>,
    pub patient_id: Option<String>,
    pub lens_factor: Option<f64>,
    pub a_constant: Option<f64>,
    /// 右眼（OD）の測定値
    pub axial_length: Option<f64>,
    pub measured_k1: Option<f64>,
    pub measured_k2: Option<f64>,
    pub optical_acd: Option<f64>,
    pub refraction: Option<f64>,
    /// 検索対象のIOL Power
    pub iol_power: Option<f64>,
}

impl PatientRecord {
    /// ヘッダー位置とセル列からレコードを構築
    pub fn from_cells(columns: &ColumnMap, cells: &[CellValue]) -> Self {
        let cell = |col: Column| columns.position(col).and_then(|pos| cells.get(pos));
        let text = |col: Column| cell(col).and_then(CellValue::as_text);
        let number = |col: Column| cell(col).and_then(CellValue::as_number);

        Self {
            doctor_name: text(Column::DoctorName),
            patient_name: text(Column::PatientName),
            patient_id: text(Column::PatientId),
            lens_factor: number(Column::LensFactor),
            a_constant: number(Column::AConstant),
            axial_length: number(Column::AxialLength),
            measured_k1: number(Column::MeasuredK1),
            measured_k2: number(Column::MeasuredK2),
            optical_acd: number(Column::OpticalAcd),
            refraction: number(Column::Refraction),
            iol_power: number(Column::IolPower),
        }
    }

    /// 検索するIOL Power（未入力・非数値は0.0）
    pub fn target_power(&self) -> f64 {
        self.iol_power.unwrap_or(0.0)
    }

    /// ログ表示用の名前（未入力は `Patient_{index}`）
    pub fn display_name(&self, index: usize) -> String {
        self.patient_name
            .clone()
            .unwrap_or_else(|| format!("Patient_{}", index))
    }

    /// フォーム上部の基本情報（Doctor Name, Patient Name, Patient ID, Lens Factor, A Constant）
    pub fn header_fields(&self) -> [(&'static str, Option<String>); 5] {
        [
            ("DoctorName", self.doctor_name.clone()),
            ("PatientName", self.patient_name.clone()),
            ("PatientID", self.patient_id.clone()),
            ("LensFactor", self.lens_factor.map(format_decimal)),
            ("AConstant", self.a_constant.map(format_decimal)),
        ]
    }

    /// 右眼の測定値（Axial Length, K1, K2, ACD, Refraction）
    pub fn od_fields(&self) -> [(&'static str, Option<String>); 5] {
        [
            ("AxialLength_R", self.axial_length.map(format_decimal)),
            ("MeasuredK1_R", self.measured_k1.map(format_decimal)),
            ("MeasuredK2_R", self.measured_k2.map(format_decimal)),
            ("OpticalACD_R", self.optical_acd.map(format_decimal)),
            ("Refraction_R", self.refraction.map(format_decimal)),
        ]
    }
}
