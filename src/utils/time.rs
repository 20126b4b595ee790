use chrono::{
    DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeDelta, TimeZone, Utc,
};

use crate::error::{AppError, AppResult};

const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// 解析客户端提交的时间字符串。
///
/// 支持:
/// - RFC 3339 (`2024-05-01T12:00:00Z`, `2024-05-01T12:00:00+08:00`)
/// - 空格分隔并带偏移 (`2024-05-01 12:00:00+08:00`)
/// - 不带时区的日期时间，按 UTC 处理
/// - 纯日期，取当天 00:00 UTC
pub fn parse_timestamp(raw: &str) -> AppResult<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Ok(dt.with_timezone(&Utc));
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Ok(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN).and_utc());
    }

    Err(AppError::ValidationError(format!("Invalid timestamp: {raw}")))
}

/// `now` 所在时区当天 00:00 对应的 UTC 时间
pub fn start_of_day<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Utc> {
    let midnight = now.date_naive().and_time(NaiveTime::MIN);
    match now.timezone().from_local_datetime(&midnight).earliest() {
        Some(dt) => dt.with_timezone(&Utc),
        // 午夜落在夏令时跳变区间：按当前偏移换算
        None => {
            let offset = now.offset().fix().local_minus_utc();
            (midnight - TimeDelta::seconds(offset as i64)).and_utc()
        }
    }
}

/// 服务器本地时区今天 00:00
pub fn start_of_today() -> DateTime<Utc> {
    start_of_day(&Local::now())
}
