// Failure diagnostics - turns yt-dlp error text into a hint for the user
//
// The raw message is always shown; the hint only adds what to try next.

/// Why a request was refused or failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockingReason {
    /// HTTP 403 Forbidden - general access denied
    Http403Forbidden,

    /// Age-restricted content requiring login
    AgeRestricted,

    /// Private video requiring authorization
    PrivateVideo,

    /// Video deleted or unavailable
    VideoUnavailable,

    /// Geographic restriction
    GeoBlocked,

    /// Rate limiting (429 or similar)
    RateLimited,

    /// Bot detection triggered
    BotDetection,

    /// Network timeout (soft IP block)
    NetworkTimeout,

    /// DRM-protected content (Premium, Music, Movies)
    DrmProtected,
}

impl BlockingReason {
    /// Permanent restrictions have no workaround
    pub fn is_permanent(&self) -> bool {
        matches!(self, Self::DrmProtected | Self::VideoUnavailable)
    }

    pub fn hint(&self) -> &'static str {
        match self {
            Self::Http403Forbidden => {
                "El servidor devolvió 403 Forbidden.\n\
                 1) Actualice yt-dlp\n\
                 2) Inténtelo de nuevo más tarde"
            }
            Self::AgeRestricted => {
                "El video tiene restricción de edad y requiere una sesión iniciada."
            }
            Self::PrivateVideo => "El video es privado.",
            Self::VideoUnavailable => {
                "El video no está disponible. Puede haber sido eliminado o hecho privado."
            }
            Self::GeoBlocked => "El video no está disponible en su país.",
            Self::RateLimited => {
                "Demasiadas peticiones. Espere 10-15 minutos antes de reintentar."
            }
            Self::BotDetection => {
                "Se detectó acceso automatizado.\n\
                 1) Actualice yt-dlp\n\
                 2) Pruebe desde otra red"
            }
            Self::NetworkTimeout => {
                "Tiempo de espera agotado. Compruebe su conexión a internet."
            }
            Self::DrmProtected => {
                "El contenido está protegido con DRM y no se puede descargar."
            }
        }
    }
}

/// Analyze an error message. `None` when nothing recognizable matched.
pub fn diagnose_error(error: &str) -> Option<BlockingReason> {
    let lower = error.to_lowercase();

    // Narrow patterns first

    if lower.contains("drm")
        || lower.contains("widevine")
        || lower.contains("youtube premium")
        || lower.contains("requires purchase")
        || lower.contains("requires payment")
    {
        return Some(BlockingReason::DrmProtected);
    }

    if lower.contains("age-restricted")
        || lower.contains("sign in to confirm your age")
        || lower.contains("age_verification")
    {
        return Some(BlockingReason::AgeRestricted);
    }

    if lower.contains("private video") || lower.contains("video is private") {
        return Some(BlockingReason::PrivateVideo);
    }

    if lower.contains("video unavailable")
        || lower.contains("video has been removed")
        || lower.contains("no longer available")
        || lower.contains("video is unavailable")
    {
        return Some(BlockingReason::VideoUnavailable);
    }

    if lower.contains("not available in your country")
        || lower.contains("blocked in your country")
        || lower.contains("geo restriction")
        || lower.contains("geo-restricted")
    {
        return Some(BlockingReason::GeoBlocked);
    }

    if lower.contains("429") || lower.contains("rate limit") || lower.contains("too many requests") {
        return Some(BlockingReason::RateLimited);
    }

    if lower.contains("not a bot")
        || lower.contains("captcha")
        || lower.contains("unusual traffic")
    {
        return Some(BlockingReason::BotDetection);
    }

    if lower.contains("403") || lower.contains("forbidden") {
        return Some(BlockingReason::Http403Forbidden);
    }

    if lower.contains("timeout")
        || lower.contains("timed out")
        || lower.contains("connection refused")
        || lower.contains("network unreachable")
    {
        return Some(BlockingReason::NetworkTimeout);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_403_detection() {
        let error = "ERROR: HTTP Error 403: Forbidden";
        assert_eq!(diagnose_error(error), Some(BlockingReason::Http403Forbidden));
    }

    #[test]
    fn test_age_restricted_detection() {
        let error = "Sign in to confirm your age";
        assert_eq!(diagnose_error(error), Some(BlockingReason::AgeRestricted));
    }

    #[test]
    fn test_bot_detection() {
        let error = "Sign in to confirm you're not a bot";
        assert_eq!(diagnose_error(error), Some(BlockingReason::BotDetection));
    }

    #[test]
    fn test_timeout_detection() {
        let error = "Timed out after 30s";
        assert_eq!(diagnose_error(error), Some(BlockingReason::NetworkTimeout));
    }

    #[test]
    fn test_geo_detection() {
        let error = "Video not available in your country";
        assert_eq!(diagnose_error(error), Some(BlockingReason::GeoBlocked));
    }

    #[test]
    fn test_drm_detection() {
        let error = "This video is DRM protected";
        assert_eq!(diagnose_error(error), Some(BlockingReason::DrmProtected));
    }

    #[test]
    fn test_rate_limit_detection() {
        let error = "HTTP Error 429: Too Many Requests";
        assert_eq!(diagnose_error(error), Some(BlockingReason::RateLimited));
    }

    #[test]
    fn test_unrecognized_has_no_reason() {
        assert_eq!(diagnose_error("Unsupported URL: https://example.com"), None);
        assert_eq!(diagnose_error(""), None);
    }

    #[test]
    fn test_permanent() {
        assert!(BlockingReason::DrmProtected.is_permanent());
        assert!(BlockingReason::VideoUnavailable.is_permanent());
        assert!(!BlockingReason::Http403Forbidden.is_permanent());
    }
}
