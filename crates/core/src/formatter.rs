//! Weather message formatting
//!
//! Turns a provider payload into the HTML reply shown in Telegram.

use chrono::{DateTime, Utc};

use crate::models::{WeatherReport, WeatherResult};
use crate::timezone::DisplayZone;

/// Reply used when no payload could be fetched
pub const FETCH_FAILED_MESSAGE: &str = "❌ Не удалось получить данные о погоде. Попробуйте позже.";

/// Reply used when a payload was fetched but lacks required fields
pub const PROCESSING_FAILED_MESSAGE: &str = "❌ Ошибка при обработке данных о погоде.";

/// Format a fetch outcome using the current time as the update stamp
pub fn format_weather(report: Option<&WeatherReport>, zone: &DisplayZone) -> String {
    format_weather_at(report, zone, Utc::now())
}

/// Format a fetch outcome with an explicit render time
///
/// Sunset comes from the payload; the "updated" line comes from `now`.
pub fn format_weather_at(
    report: Option<&WeatherReport>,
    zone: &DisplayZone,
    now: DateTime<Utc>,
) -> String {
    let Some(report) = report else {
        return FETCH_FAILED_MESSAGE.to_string();
    };

    match WeatherResult::try_from(report) {
        Ok(result) => render(&result, zone, now),
        Err(e) => {
            tracing::error!("Unexpected weather payload structure: {}", e);
            PROCESSING_FAILED_MESSAGE.to_string()
        }
    }
}

fn render(result: &WeatherResult, zone: &DisplayZone, now: DateTime<Utc>) -> String {
    format!(
        "🌤 <b>Погода в {city}</b>\n\n\
         📝 <b>Описание:</b> {description}\n\
         🌡 <b>Температура:</b> {temp} °C\n\
         💧 <b>Влажность:</b> {humidity}%\n\
         📊 <b>Давление:</b> {pressure} гПа\n\
         💨 <b>Скорость ветра:</b> {wind} м/с\n\
         🌅 <b>Закат:</b> {sunset}\n\n\
         🔄 Обновлено: {updated}",
        city = escape_html(&result.city_name),
        description = escape_html(&capitalize(&result.description)),
        temp = result.temperature_celsius,
        humidity = result.humidity_percent,
        pressure = result.pressure_hpa,
        wind = result.wind_speed_mps,
        sunset = zone.clock(result.sunset),
        updated = zone.clock(now),
    )
}

/// Upper-case the first character and lower-case the rest
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    chars.next().map_or_else(String::new, |first| {
        first
            .to_uppercase()
            .chain(chars.as_str().to_lowercase().chars())
            .collect()
    })
}

/// Escape the characters Telegram's HTML parse mode treats as markup
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
