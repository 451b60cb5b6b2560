use crate::{
    AuthResponse, Car, CarId, Floor, LoginRequest, NewCar, ParkingSession, ParkingSpot,
    RegisterRequest, SessionId, SpotNumber, User,
};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer, de::DeserializeOwned};

/// HTTP Methods for API Requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// A trait that defines the request-response relationship and metadata for an API endpoint.
pub trait ApiRequest: Serialize {
    /// The response type returned by this request.
    type Response: DeserializeOwned;
    /// The HTTP method.
    const METHOD: HttpMethod;
    /// Whether the request itself is sent as the JSON body.
    const HAS_BODY: bool;

    /// The URL path, relative to the `/api` prefix.
    fn path(&self) -> String;

    /// Optional query string (without the leading `?`).
    fn query(&self) -> Option<String> {
        None
    }
}

// =========================================================
// Auth
// =========================================================

impl ApiRequest for RegisterRequest {
    type Response = AuthResponse;
    const METHOD: HttpMethod = HttpMethod::Post;
    const HAS_BODY: bool = true;

    fn path(&self) -> String {
        "/auth/register".to_string()
    }
}

impl ApiRequest for LoginRequest {
    type Response = AuthResponse;
    const METHOD: HttpMethod = HttpMethod::Post;
    const HAS_BODY: bool = true;

    fn path(&self) -> String {
        "/auth/login".to_string()
    }
}

/// Fetch the user owning the current token
#[derive(Debug, Serialize)]
pub struct CurrentUserRequest;

impl ApiRequest for CurrentUserRequest {
    type Response = User;
    const METHOD: HttpMethod = HttpMethod::Get;
    const HAS_BODY: bool = false;

    fn path(&self) -> String {
        "/auth/me".to_string()
    }
}

// =========================================================
// Cars
// =========================================================

#[derive(Debug, Serialize)]
pub struct ListCarsRequest;

impl ApiRequest for ListCarsRequest {
    type Response = Vec<Car>;
    const METHOD: HttpMethod = HttpMethod::Get;
    const HAS_BODY: bool = false;

    fn path(&self) -> String {
        "/cars".to_string()
    }
}

impl ApiRequest for NewCar {
    type Response = Car;
    const METHOD: HttpMethod = HttpMethod::Post;
    const HAS_BODY: bool = true;

    fn path(&self) -> String {
        "/cars".to_string()
    }
}

#[derive(Debug, Serialize)]
pub struct DeleteCarRequest {
    pub id: CarId,
}

impl ApiRequest for DeleteCarRequest {
    // 204 No Content
    type Response = ();
    const METHOD: HttpMethod = HttpMethod::Delete;
    const HAS_BODY: bool = false;

    fn path(&self) -> String {
        format!("/cars/{}", self.id)
    }
}

// =========================================================
// Spots & Parking
// =========================================================

/// List free spots, optionally restricted to one floor
#[derive(Debug, Default, Serialize)]
pub struct AvailableSpotsRequest {
    pub floor: Option<Floor>,
}

impl ApiRequest for AvailableSpotsRequest {
    type Response = Vec<ParkingSpot>;
    const METHOD: HttpMethod = HttpMethod::Get;
    const HAS_BODY: bool = false;

    fn path(&self) -> String {
        "/spots/available".to_string()
    }

    fn query(&self) -> Option<String> {
        self.floor.map(|floor| format!("floor={}", floor))
    }
}

/// How the target spot is chosen
#[derive(Debug, Clone, PartialEq)]
pub enum SpotChoice {
    /// The user clicked a specific spot
    Manual {
        floor: Floor,
        spot_number: SpotNumber,
    },
    /// Let the server pick the best free spot
    Auto,
}

/// Start a parking session
///
/// On the wire `Auto` is expressed by leaving out `floor` and `spotNumber`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParkRequest {
    pub car_id: CarId,
    pub choice: SpotChoice,
}

impl ParkRequest {
    pub fn manual(car_id: CarId, floor: Floor, spot_number: SpotNumber) -> Self {
        Self {
            car_id,
            choice: SpotChoice::Manual { floor, spot_number },
        }
    }

    pub fn auto(car_id: CarId) -> Self {
        Self {
            car_id,
            choice: SpotChoice::Auto,
        }
    }
}

impl Serialize for ParkRequest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match &self.choice {
            SpotChoice::Manual { floor, spot_number } => {
                let mut s = serializer.serialize_struct("ParkRequest", 3)?;
                s.serialize_field("carId", &self.car_id)?;
                s.serialize_field("floor", floor)?;
                s.serialize_field("spotNumber", spot_number)?;
                s.end()
            }
            SpotChoice::Auto => {
                let mut s = serializer.serialize_struct("ParkRequest", 1)?;
                s.serialize_field("carId", &self.car_id)?;
                s.end()
            }
        }
    }
}

impl ApiRequest for ParkRequest {
    type Response = ParkingSession;
    const METHOD: HttpMethod = HttpMethod::Post;
    const HAS_BODY: bool = true;

    fn path(&self) -> String {
        "/parking/park".to_string()
    }
}

#[derive(Debug, Serialize)]
pub struct ActiveSessionsRequest;

impl ApiRequest for ActiveSessionsRequest {
    type Response = Vec<ParkingSession>;
    const METHOD: HttpMethod = HttpMethod::Get;
    const HAS_BODY: bool = false;

    fn path(&self) -> String {
        "/parking/active".to_string()
    }
}

/// End a parking session
#[derive(Debug, Serialize)]
pub struct LeaveSpotRequest {
    pub session_id: SessionId,
}

impl ApiRequest for LeaveSpotRequest {
    type Response = ();
    const METHOD: HttpMethod = HttpMethod::Post;
    const HAS_BODY: bool = false;

    fn path(&self) -> String {
        format!("/parking/{}/leave", self.session_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_manual_park_body() {
        let req = ParkRequest::manual(7, 2, SpotNumber::Label("14".to_string()));
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({"carId": 7, "floor": 2, "spotNumber": "14"})
        );
    }

    #[test]
    fn test_auto_park_omits_spot_fields() {
        let req = ParkRequest::auto(7);
        assert_eq!(serde_json::to_value(&req).unwrap(), json!({"carId": 7}));
    }

    #[test]
    fn test_paths_with_ids() {
        assert_eq!(DeleteCarRequest { id: 5 }.path(), "/cars/5");
        assert_eq!(LeaveSpotRequest { session_id: 9 }.path(), "/parking/9/leave");
        assert_eq!(LeaveSpotRequest::METHOD, HttpMethod::Post);
        assert!(!LeaveSpotRequest::HAS_BODY);
    }

    #[test]
    fn test_floor_filter_query() {
        assert_eq!(AvailableSpotsRequest { floor: None }.query(), None);
        assert_eq!(
            AvailableSpotsRequest { floor: Some(3) }.query().as_deref(),
            Some("floor=3")
        );
    }
}
