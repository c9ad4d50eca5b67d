pub mod policy;
pub use policy::{Requirement, authorize};

pub mod auth_service;
pub use auth_service::{AuthError, AuthService, RegisterInput};

pub mod auth_service_impl;
pub use auth_service_impl::SeaOrmAuthService;

pub mod clan_service;
pub use clan_service::{ClanError, ClanService, CreateClanInput};

pub mod clan_service_impl;
pub use clan_service_impl::SeaOrmClanService;

pub mod cms_service;
pub use cms_service::{CmsError, CmsService, CmsView};

pub mod cms_service_impl;
pub use cms_service_impl::SeaOrmCmsService;

pub mod tournament_service;
pub use tournament_service::{
    CreateTournamentInput, RegistrationAction, TournamentError, TournamentService,
    UpdateTournamentInput,
};

pub mod tournament_service_impl;
pub use tournament_service_impl::SeaOrmTournamentService;
