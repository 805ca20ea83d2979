// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Actor roles and role-based authorization for API operations.

use fleet_audit::Actor;

use crate::error::AuthError;

/// Actor roles for authorization.
///
/// Roles determine which workflow actions an authenticated actor may
/// perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Requester role: staff who submit booking requests.
    Requester,
    /// Supervisor role: operators who approve or reject submitted
    /// bookings.
    Supervisor,
    /// Allocator role: operators who assign vehicles and drivers (or
    /// an external provider) to approved requests, and may reject a
    /// request when no resources can be found.
    Allocator,
    /// Driver role: drivers who execute trips. A driver may only act
    /// on trips assigned to their own identity.
    Driver,
    /// Admin role: system operators with full authority, including
    /// fleet registry management.
    Admin,
}

impl Role {
    /// Returns the role name used in audit records and error messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Requester => "requester",
            Self::Supervisor => "supervisor",
            Self::Allocator => "allocator",
            Self::Driver => "driver",
            Self::Admin => "admin",
        }
    }
}

/// An authenticated actor with an associated role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedActor {
    /// The unique identifier for this actor.
    pub id: String,
    /// The role assigned to this actor.
    pub role: Role,
}

impl AuthenticatedActor {
    /// Creates a new authenticated actor.
    ///
    /// # Arguments
    ///
    /// * `id` - The unique identifier for this actor
    /// * `role` - The role assigned to this actor
    #[must_use]
    pub const fn new(id: String, role: Role) -> Self {
        Self { id, role }
    }

    /// Converts this authenticated actor into an audit Actor.
    #[must_use]
    pub fn to_audit_actor(&self) -> Actor {
        Actor::new(self.id.clone(), self.role.as_str().to_string())
    }
}

/// Stub authentication function.
///
/// This does NOT implement real authentication. In a real deployment
/// this would validate credentials or integrate with an identity
/// provider.
///
/// # Errors
///
/// Returns an error if the actor ID is empty.
pub fn authenticate_stub(actor_id: String, role: Role) -> Result<AuthenticatedActor, AuthError> {
    if actor_id.is_empty() {
        return Err(AuthError::AuthenticationFailed {
            reason: String::from("Actor ID cannot be empty"),
        });
    }
    Ok(AuthenticatedActor::new(actor_id, role))
}

/// Authorization service for enforcing role-based access control.
pub struct AuthorizationService;

impl AuthorizationService {
    /// Checks if an actor may manage the fleet registry.
    ///
    /// Only Admin actors may register vehicles and drivers.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor does not have the Admin role.
    pub fn authorize_manage_fleet(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        match actor.role {
            Role::Admin => Ok(()),
            _ => Err(AuthError::Unauthorized {
                action: String::from("manage_fleet"),
                required_role: String::from("Admin"),
            }),
        }
    }

    /// Checks if an actor may submit a booking.
    ///
    /// Any authenticated actor may submit a request.
    ///
    /// # Errors
    ///
    /// Never fails; present for symmetry with the other checks.
    pub const fn authorize_submit(_actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Ok(())
    }

    /// Checks if an actor may approve a submitted booking.
    ///
    /// # Errors
    ///
    /// Returns an error unless the actor is a Supervisor or Admin.
    pub fn authorize_approve(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        match actor.role {
            Role::Supervisor | Role::Admin => Ok(()),
            _ => Err(AuthError::Unauthorized {
                action: String::from("approve_booking"),
                required_role: String::from("Supervisor"),
            }),
        }
    }

    /// Checks if an actor may reject a booking.
    ///
    /// Supervisors reject at the review stage; allocators reject when
    /// no resources can be found.
    ///
    /// # Errors
    ///
    /// Returns an error unless the actor is a Supervisor, Allocator, or
    /// Admin.
    pub fn authorize_reject(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        match actor.role {
            Role::Supervisor | Role::Allocator | Role::Admin => Ok(()),
            _ => Err(AuthError::Unauthorized {
                action: String::from("reject_booking"),
                required_role: String::from("Supervisor or Allocator"),
            }),
        }
    }

    /// Checks if an actor may allocate resources to a booking.
    ///
    /// # Errors
    ///
    /// Returns an error unless the actor is an Allocator or Admin.
    pub fn authorize_allocate(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        match actor.role {
            Role::Allocator | Role::Admin => Ok(()),
            _ => Err(AuthError::Unauthorized {
                action: String::from("allocate_booking"),
                required_role: String::from("Allocator"),
            }),
        }
    }

    /// Checks if an actor may start or end a trip for the given driver.
    ///
    /// A Driver actor may only act as themselves: their actor ID must
    /// match the driver's identity. Admins may act for any driver.
    ///
    /// # Arguments
    ///
    /// * `actor` - The authenticated actor
    /// * `driver_identity` - The identity of the trip's driver
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is neither the driver nor an Admin.
    pub fn authorize_trip(
        actor: &AuthenticatedActor,
        driver_identity: &str,
    ) -> Result<(), AuthError> {
        match actor.role {
            Role::Admin => Ok(()),
            Role::Driver if actor.id == driver_identity => Ok(()),
            _ => Err(AuthError::Unauthorized {
                action: String::from("trip_operation"),
                required_role: String::from("Driver (own trips) or Admin"),
            }),
        }
    }
}
