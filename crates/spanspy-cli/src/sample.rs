//! Built-in demo schema for `--sample`.

/// Singers and their albums, with one interleaved child and one named foreign key.
pub const SAMPLE_DDL: &str = "
CREATE TABLE Singers (
  SingerId INT64 NOT NULL,
  FirstName STRING,
  LastName STRING NOT NULL,
  CreatedAt TIMESTAMP NOT NULL,
) PRIMARY KEY (SingerId);

CREATE TABLE Albums (
  SingerId INT64 NOT NULL,
  AlbumId INT64 NOT NULL,
  AlbumTitle STRING,
  ReleaseDate DATE,
  CONSTRAINT fk_albums_singers FOREIGN KEY (SingerId) REFERENCES Singers (SingerId),
) PRIMARY KEY (SingerId, AlbumId),
  INTERLEAVE IN PARENT Singers;
";
