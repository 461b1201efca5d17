//! Date Converter Module
//!
//! 日時をスプレッドシートのシリアル値（1899年12月30日起算の日数）に変換するモジュール。
//!
//! # エポック
//!
//! 1900年システムの慣例に合わせて1899-12-30T00:00:00Zを0とします。
//! （Excelの1900年うるう年バグの影響で、1900年3月1日以降の日付がExcelの表示と一致します）
//!
//! # タイムゾーン
//!
//! 変換は常にUTCで行います。`CellValue::Date`は構築時にUTCへ正規化されるため、
//! 同じ瞬間を表す日時は常に同じシリアル値になります。この方針は設定で変更できません。
//!
//! # 範囲
//!
//! 1900-01-01T00:00:00Z から 9999-12-31T23:59:59.999Z まで。範囲外の日時は
//! 切り詰めずにエラーとして扱います。最終ミリ秒より後のマイクロ秒は
//! 倍精度では10000-01-01のシリアル値に丸められるため、上限に含めません。

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

const MICROS_PER_DAY: f64 = 86_400_000_000.0;

fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32, micro: u32) -> Option<DateTime<Utc>> {
    let naive = NaiveDate::from_ymd_opt(y, m, d)?.and_hms_micro_opt(h, min, s, micro)?;
    Some(Utc.from_utc_datetime(&naive))
}

fn epoch() -> Option<DateTime<Utc>> {
    utc(1899, 12, 30, 0, 0, 0, 0)
}

/// 表現可能な最小の日時
pub fn min_date() -> Option<DateTime<Utc>> {
    utc(1900, 1, 1, 0, 0, 0, 0)
}

/// 表現可能な最大の日時（シリアル値が2958466未満に収まる最後のミリ秒）
pub fn max_date() -> Option<DateTime<Utc>> {
    utc(9999, 12, 31, 23, 59, 59, 999_000)
}

/// 日時をシリアル値（日数、時刻は小数部）に変換する
///
/// # 戻り値
///
/// * `Some(f64)` - シリアル値（マイクロ秒精度）
/// * `None` - 表現可能な範囲外の日時
///
/// # 使用例
///
/// ```rust
/// use chrono::{TimeZone, Utc};
/// use xlsxstream::to_epoch_days;
///
/// let noon = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
/// assert_eq!(to_epoch_days(&noon), Some(45658.5));
/// ```
pub fn to_epoch_days(ts: &DateTime<Utc>) -> Option<f64> {
    if *ts < min_date()? || *ts > max_date()? {
        return None;
    }
    let micros = ts.signed_duration_since(epoch()?).num_microseconds()?;
    Some(micros as f64 / MICROS_PER_DAY)
}

/// シリアル値を日時に戻す（`to_epoch_days`の逆変換）
///
/// 結果はマイクロ秒単位に丸められます。
pub fn from_epoch_days(days: f64) -> Option<DateTime<Utc>> {
    if !days.is_finite() {
        return None;
    }
    let micros = (days * MICROS_PER_DAY).round();
    if micros.abs() >= i64::MAX as f64 {
        return None;
    }
    epoch()?.checked_add_signed(Duration::microseconds(micros as i64))
}
