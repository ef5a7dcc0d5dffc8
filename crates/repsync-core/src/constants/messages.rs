// ABOUTME: User-facing messages surfaced by the data layer, in the app's language (Spanish)
// ABOUTME: Errors never expose raw provider text; these strings are shown verbatim
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Offline and nothing cached for an exercise listing
pub const OFFLINE_NO_EXERCISES: &str = "Sin conexión y no hay ejercicios guardados localmente.";

/// Offline and the requested exercise is not cached
pub const OFFLINE_NO_EXERCISE: &str = "Sin conexión y el ejercicio no está guardado localmente.";

/// Retries exhausted on timeouts / network failures
pub const SERVICE_WAKING_UP: &str =
    "El servidor puede estar despertando. Intenta de nuevo en unos segundos.";

/// Persistent 5xx responses
pub const SERVER_ERROR: &str = "Error del servidor. Intenta más tarde.";

/// Exercise lookup returned 404
pub const EXERCISE_NOT_FOUND: &str = "Ejercicio no encontrado.";

/// Generic 404 for non-exercise resources
pub const RESOURCE_NOT_FOUND: &str = "No se encontró el recurso solicitado.";

/// Other 4xx responses
pub const REQUEST_REJECTED: &str = "La solicitud no es válida.";

/// Local storage failure on a write that must succeed
pub const STORAGE_FAILED: &str = "No se pudieron guardar los datos en el dispositivo.";

/// Fallback for anything unclassified
pub const UNEXPECTED_ERROR: &str = "Ocurrió un error inesperado. Intenta de nuevo.";

/// Auth: email already registered
pub const AUTH_EMAIL_IN_USE: &str = "Este correo ya está registrado.";
/// Auth: wrong password
pub const AUTH_WRONG_PASSWORD: &str = "Contraseña incorrecta.";
/// Auth: no account for the email
pub const AUTH_USER_NOT_FOUND: &str = "No existe una cuenta con este correo.";
/// Auth: malformed email
pub const AUTH_INVALID_EMAIL: &str = "El correo electrónico no es válido.";
/// Auth: password too weak
pub const AUTH_WEAK_PASSWORD: &str = "La contraseña debe tener al menos 6 caracteres.";
/// Auth: provider-side throttling
pub const AUTH_TOO_MANY_REQUESTS: &str = "Demasiados intentos. Intenta más tarde.";
/// Auth: network failure during auth
pub const AUTH_NETWORK_FAILED: &str = "Error de conexión. Verifica tu internet.";
/// Auth: invalid credential bundle
pub const AUTH_INVALID_CREDENTIAL: &str = "Correo o contraseña incorrectos.";
/// Auth: account disabled
pub const AUTH_USER_DISABLED: &str = "Esta cuenta ha sido deshabilitada.";

/// Validation: missing email
pub const VALIDATION_EMAIL_REQUIRED: &str = "El correo electrónico es obligatorio.";
/// Validation: missing password
pub const VALIDATION_PASSWORD_REQUIRED: &str = "La contraseña es obligatoria.";
/// Validation: missing display name
pub const VALIDATION_NAME_REQUIRED: &str = "El nombre es obligatorio.";
/// Validation: missing user id on a document operation
pub const VALIDATION_USER_REQUIRED: &str = "Se requiere un usuario válido.";
/// Validation: routine without a name
pub const VALIDATION_ROUTINE_NAME_REQUIRED: &str = "La rutina necesita un nombre.";

/// Routine: another routine already uses this name
pub const ROUTINE_DUPLICATE: &str = "Ya existe una rutina con este nombre.";
/// Routine: unknown id
pub const ROUTINE_NOT_FOUND: &str = "Rutina no encontrada.";

/// Local rate limiter rejected the attempt
#[must_use]
pub fn rate_limited(remaining_secs: u64) -> String {
    format!("Demasiados intentos. Espera {remaining_secs} segundos antes de volver a intentar.")
}

/// Localized message for an auth provider error code
///
/// Accepts codes with or without the `auth/` namespace. Unknown codes fall back
/// to the generic message.
#[must_use]
pub fn auth_message(code: &str) -> &'static str {
    match code.strip_prefix("auth/").unwrap_or(code) {
        "email-already-in-use" => AUTH_EMAIL_IN_USE,
        "wrong-password" => AUTH_WRONG_PASSWORD,
        "user-not-found" => AUTH_USER_NOT_FOUND,
        "invalid-email" => AUTH_INVALID_EMAIL,
        "weak-password" => AUTH_WEAK_PASSWORD,
        "too-many-requests" => AUTH_TOO_MANY_REQUESTS,
        "network-request-failed" => AUTH_NETWORK_FAILED,
        "invalid-credential" => AUTH_INVALID_CREDENTIAL,
        "user-disabled" => AUTH_USER_DISABLED,
        _ => UNEXPECTED_ERROR,
    }
}
