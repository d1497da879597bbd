//! Host fault codes and their diagnostic strings.
//!
//! The strings are for logs only; nothing branches on them.

use std::fmt;

macro_rules! exceptions {
    ($( $variant:ident = $code:literal => $text:literal ),* $(,)?) => {
        /// Fault code reported in an inbound exception message.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Exception {
            $( $variant, )*
        }

        impl Exception {
            pub fn from_code(code: u32) -> Option<Self> {
                match code {
                    $( $code => Some(Exception::$variant), )*
                    _ => None,
                }
            }

            pub fn code(self) -> u32 {
                match self {
                    $( Exception::$variant => $code, )*
                }
            }

            pub fn as_str(self) -> &'static str {
                match self {
                    $( Exception::$variant => $text, )*
                }
            }
        }
    };
}

exceptions! {
    NoError = 0 => "NONE",
    Error = 1 => "ERROR",
    SizeMismatch = 2 => "SIZE_MISMATCH",
    UnrecognizedId = 3 => "UNRECOGNIZED_ID",
    Unopened = 4 => "UNOPENED",
    VersionMismatch = 5 => "VERSION_MISMATCH",
    TooManyGroups = 6 => "TOO_MANY_GROUPS",
    NameUnrecognized = 7 => "NAME_UNRECOGNIZED",
    TooManyEventNames = 8 => "TOO_MANY_EVENT_NAMES",
    EventIdDuplicate = 9 => "EVENT_ID_DUPLICATE",
    TooManyMaps = 10 => "TOO_MANY_MAPS",
    TooManyObjects = 11 => "TOO_MANY_OBJECTS",
    TooManyRequests = 12 => "TOO_MANY_REQUESTS",
    WeatherInvalidPort = 13 => "WEATHER_INVALID_PORT",
    WeatherInvalidMetar = 14 => "WEATHER_INVALID_METAR",
    WeatherUnableToGetObservation = 15 => "WEATHER_UNABLE_TO_GET_OBSERVATION",
    WeatherUnableToCreateStation = 16 => "WEATHER_UNABLE_TO_CREATE_STATION",
    WeatherUnableToRemoveStation = 17 => "WEATHER_UNABLE_TO_REMOVE_STATION",
    InvalidDataType = 18 => "INVALID_DATA_TYPE",
    InvalidDataSize = 19 => "INVALID_DATA_SIZE",
    DataError = 20 => "DATA_ERROR",
    InvalidArray = 21 => "INVALID_ARRAY",
    CreateObjectFailed = 22 => "CREATE_OBJECT_FAILED",
    LoadFlightplanFailed = 23 => "LOAD_FLIGHTPLAN_FAILED",
    OperationInvalidForObjectType = 24 => "OPERATION_INVALID_FOR_OBJECT_TYPE",
    IllegalOperation = 25 => "ILLEGAL_OPERATION",
    AlreadySubscribed = 26 => "ALREADY_SUBSCRIBED",
    InvalidEnum = 27 => "INVALID_ENUM",
    DefinitionError = 28 => "DEFINITION_ERROR",
    DuplicateId = 29 => "DUPLICATE_ID",
    DatumId = 30 => "DATUM_ID",
    OutOfBounds = 31 => "OUT_OF_BOUNDS",
    AlreadyCreated = 32 => "ALREADY_CREATED",
    ObjectOutsideRealityBubble = 33 => "OBJECT_OUTSIDE_REALITY_BUBBLE",
    ObjectContainer = 34 => "OBJECT_CONTAINER",
    ObjectAi = 35 => "OBJECT_AI",
    ObjectAtc = 36 => "OBJECT_ATC",
    ObjectSchedule = 37 => "OBJECT_SCHEDULE",
}

impl fmt::Display for Exception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Translate a raw fault code into its diagnostic string, `"UNKNOWN"` for
/// codes outside the known vocabulary.
pub fn exception_string(code: u32) -> &'static str {
    Exception::from_code(code).map_or("UNKNOWN", Exception::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_translate() {
        assert_eq!(exception_string(0), "NONE");
        assert_eq!(exception_string(7), "NAME_UNRECOGNIZED");
        assert_eq!(exception_string(37), "OBJECT_SCHEDULE");
    }

    #[test]
    fn unknown_code_is_reported_as_unknown() {
        assert_eq!(exception_string(38), "UNKNOWN");
        assert_eq!(exception_string(u32::MAX), "UNKNOWN");
    }

    #[test]
    fn codes_round_trip() {
        for code in 0..=37 {
            let exception = Exception::from_code(code).unwrap();
            assert_eq!(exception.code(), code);
        }
    }
}
