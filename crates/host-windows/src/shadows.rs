use std::mem::ManuallyDrop;

use log::{debug, warn};
use shadowforge_core::provider::{CreateMode, SnapshotProvider};
use shadowforge_core::{cim_datetime_to_rfc3339, ShadowError, Snapshot, Volume};

use windows::core::{w, BSTR};
use windows::Win32::System::Com::{
    CoCreateInstance, CoInitializeEx, CoInitializeSecurity, CoSetProxyBlanket,
    CLSCTX_INPROC_SERVER, COINIT_MULTITHREADED, EOAC_NONE, RPC_C_AUTHN_LEVEL_CALL,
    RPC_C_AUTHN_LEVEL_DEFAULT, RPC_C_IMP_LEVEL_IMPERSONATE,
};
use windows::Win32::System::Rpc::{RPC_C_AUTHN_WINNT, RPC_C_AUTHZ_NONE};
use windows::Win32::System::Variant::{
    VariantClear, VARIANT, VARIANT_0_0, VARIANT_0_0_0, VT_BOOL, VT_BSTR, VT_I4, VT_UI4,
};
use windows::Win32::System::Wmi::{
    IEnumWbemClassObject, IWbemClassObject, IWbemLocator, IWbemServices, WbemLocator,
    WBEM_FLAG_FORWARD_ONLY, WBEM_FLAG_RETURN_IMMEDIATELY, WBEM_FLAG_RETURN_WBEM_COMPLETE,
    WBEM_INFINITE,
};

use crate::volumes;

const SHADOW_CLASS: &str = "Win32_ShadowCopy";

/// Snapshot provider backed by the platform shadow copy service, reached over
/// WMI (`ROOT\CIMV2`, `Win32_ShadowCopy`). Volume attributes come from the
/// Win32 volume APIs instead, which is why the two query paths can disagree
/// on identifier formatting.
pub struct VssProvider {
    services: IWbemServices,
}

fn platform_err(context: &str, err: windows::core::Error) -> ShadowError {
    ShadowError::PlatformQueryFailed(format!("{context}: {err}"))
}

impl VssProvider {
    pub fn connect() -> Result<Self, ShadowError> {
        unsafe {
            CoInitializeEx(None, COINIT_MULTITHREADED)
                .ok()
                .map_err(|err| platform_err("CoInitializeEx", err))?;

            // Fails with RPC_E_TOO_LATE when the process already configured
            // security; the existing blanket is fine for our queries.
            if let Err(err) = CoInitializeSecurity(
                None,
                -1,
                None,
                None,
                RPC_C_AUTHN_LEVEL_DEFAULT,
                RPC_C_IMP_LEVEL_IMPERSONATE,
                None,
                EOAC_NONE,
                None,
            ) {
                debug!("CoInitializeSecurity skipped: {err}");
            }

            let locator: IWbemLocator = CoCreateInstance(&WbemLocator, None, CLSCTX_INPROC_SERVER)
                .map_err(|err| platform_err("CoCreateInstance(WbemLocator)", err))?;

            let services = locator
                .ConnectServer(
                    &BSTR::from(r"ROOT\CIMV2"),
                    &BSTR::new(),
                    &BSTR::new(),
                    &BSTR::new(),
                    0,
                    &BSTR::new(),
                    None,
                )
                .map_err(|err| platform_err("ConnectServer", err))?;

            CoSetProxyBlanket(
                &services,
                RPC_C_AUTHN_WINNT,
                RPC_C_AUTHZ_NONE,
                None,
                RPC_C_AUTHN_LEVEL_CALL,
                RPC_C_IMP_LEVEL_IMPERSONATE,
                None,
                EOAC_NONE,
            )
            .map_err(|err| platform_err("CoSetProxyBlanket", err))?;

            Ok(Self { services })
        }
    }

    fn query(&self, wql: &str) -> Result<IEnumWbemClassObject, ShadowError> {
        unsafe {
            self.services
                .ExecQuery(
                    &BSTR::from("WQL"),
                    &BSTR::from(wql),
                    WBEM_FLAG_FORWARD_ONLY | WBEM_FLAG_RETURN_IMMEDIATELY,
                    None,
                )
                .map_err(|err| platform_err("ExecQuery", err))
        }
    }
}

impl SnapshotProvider for VssProvider {
    fn enumerate_volumes(&self) -> Result<Vec<Volume>, ShadowError> {
        volumes::enumerate_volume_mounts()
    }

    fn enumerate_snapshots(&self) -> Result<Vec<Snapshot>, ShadowError> {
        let enumerator = self.query("SELECT * FROM Win32_ShadowCopy")?;
        let mut snapshots = Vec::new();

        loop {
            let mut row: [Option<IWbemClassObject>; 1] = [None];
            let mut returned = 0u32;
            let hr = unsafe { enumerator.Next(WBEM_INFINITE, &mut row, &mut returned) };
            if hr.is_err() {
                return Err(ShadowError::PlatformQueryFailed(format!(
                    "shadow copy enumeration failed: {hr:?}"
                )));
            }
            if returned == 0 {
                break;
            }
            let Some(object) = row[0].take() else {
                break;
            };
            match snapshot_from_object(&object) {
                Ok(snapshot) => snapshots.push(snapshot),
                Err(err) => warn!("skipping malformed shadow copy record: {err}"),
            }
        }

        Ok(snapshots)
    }

    fn create_snapshot(
        &self,
        device_id: &str,
        mode: CreateMode,
    ) -> Result<String, ShadowError> {
        unsafe {
            let mut class_object: Option<IWbemClassObject> = None;
            self.services
                .GetObject(
                    &BSTR::from(SHADOW_CLASS),
                    WBEM_FLAG_RETURN_WBEM_COMPLETE,
                    None,
                    Some(&mut class_object),
                    None,
                )
                .map_err(|err| platform_err("GetObject(Win32_ShadowCopy)", err))?;
            let class_object = class_object.ok_or_else(|| {
                ShadowError::PlatformQueryFailed("shadow copy class unavailable".to_string())
            })?;

            let mut in_signature: Option<IWbemClassObject> = None;
            let mut out_signature: Option<IWbemClassObject> = None;
            class_object
                .GetMethod(w!("Create"), 0, &mut in_signature, &mut out_signature)
                .map_err(|err| platform_err("GetMethod(Create)", err))?;
            let in_signature = in_signature.ok_or_else(|| {
                ShadowError::PlatformQueryFailed("Create method has no in-parameters".to_string())
            })?;

            let in_params = in_signature
                .SpawnInstance(0)
                .map_err(|err| platform_err("SpawnInstance", err))?;

            let mut volume = bstr_variant(device_id);
            let mut context = bstr_variant(mode.as_context_str());
            let put_result = in_params
                .Put(w!("Volume"), 0, &volume, 0)
                .and_then(|()| in_params.Put(w!("Context"), 0, &context, 0));
            let _ = VariantClear(&mut volume);
            let _ = VariantClear(&mut context);
            put_result.map_err(|err| platform_err("Put(Create in-parameters)", err))?;

            let mut out_params: Option<IWbemClassObject> = None;
            self.services
                .ExecMethod(
                    &BSTR::from(SHADOW_CLASS),
                    &BSTR::from("Create"),
                    0,
                    None,
                    &in_params,
                    Some(&mut out_params),
                    None,
                )
                .map_err(|err| {
                    ShadowError::CreationFailed(format!("ExecMethod(Create): {err}"))
                })?;
            let out_params = out_params.ok_or_else(|| {
                ShadowError::CreationFailed("Create returned no out-parameters".to_string())
            })?;

            let return_value = get_u32(&out_params, w!("ReturnValue")).unwrap_or(u32::MAX);
            if return_value != 0 {
                return Err(ShadowError::CreationFailed(format!(
                    "provider returned code {return_value}"
                )));
            }

            get_string(&out_params, w!("ShadowID")).ok_or_else(|| {
                ShadowError::CreationFailed("provider returned no shadow identifier".to_string())
            })
        }
    }

    fn delete_snapshot(&self, snapshot_id: &str) -> Result<(), ShadowError> {
        let object_path = format!("{SHADOW_CLASS}.ID=\"{snapshot_id}\"");
        unsafe {
            self.services
                .DeleteInstance(&BSTR::from(object_path), 0, None, None)
                .map_err(|err| ShadowError::DeletionFailed {
                    snapshot_id: snapshot_id.to_string(),
                    reason: err.to_string(),
                })
        }
    }
}

fn snapshot_from_object(object: &IWbemClassObject) -> Result<Snapshot, ShadowError> {
    let id = get_string(object, w!("ID")).ok_or_else(|| {
        ShadowError::InvalidRecord("shadow copy record without ID".to_string())
    })?;
    let volume_device_id = get_string(object, w!("VolumeName")).ok_or_else(|| {
        ShadowError::InvalidRecord("shadow copy record without VolumeName".to_string())
    })?;

    let mut snapshot = Snapshot::new(id, volume_device_id)?;
    snapshot.created_at_utc =
        get_string(object, w!("InstallDate")).and_then(|raw| cim_datetime_to_rfc3339(&raw));
    snapshot.persistent = get_bool(object, w!("Persistent")).unwrap_or(false);
    snapshot.client_accessible = get_bool(object, w!("ClientAccessible")).unwrap_or(false);
    snapshot.state = get_u32(object, w!("State")).unwrap_or(0);
    Ok(snapshot)
}

fn bstr_variant(value: &str) -> VARIANT {
    VARIANT {
        Anonymous: windows::Win32::System::Variant::VARIANT_0 {
            Anonymous: ManuallyDrop::new(VARIANT_0_0 {
                vt: VT_BSTR,
                wReserved1: 0,
                wReserved2: 0,
                wReserved3: 0,
                Anonymous: VARIANT_0_0_0 {
                    bstrVal: ManuallyDrop::new(BSTR::from(value)),
                },
            }),
        },
    }
}

fn get_string(object: &IWbemClassObject, name: windows::core::PCWSTR) -> Option<String> {
    unsafe {
        let mut value = VARIANT::default();
        object.Get(name, 0, &mut value, None, None).ok()?;
        let result = {
            let inner = &value.Anonymous.Anonymous;
            if inner.vt == VT_BSTR {
                Some(inner.Anonymous.bstrVal.to_string())
            } else {
                None
            }
        };
        let _ = VariantClear(&mut value);
        result
    }
}

fn get_bool(object: &IWbemClassObject, name: windows::core::PCWSTR) -> Option<bool> {
    unsafe {
        let mut value = VARIANT::default();
        object.Get(name, 0, &mut value, None, None).ok()?;
        let result = {
            let inner = &value.Anonymous.Anonymous;
            if inner.vt == VT_BOOL {
                Some(inner.Anonymous.boolVal.as_bool())
            } else {
                None
            }
        };
        let _ = VariantClear(&mut value);
        result
    }
}

fn get_u32(object: &IWbemClassObject, name: windows::core::PCWSTR) -> Option<u32> {
    unsafe {
        let mut value = VARIANT::default();
        object.Get(name, 0, &mut value, None, None).ok()?;
        let result = {
            let inner = &value.Anonymous.Anonymous;
            if inner.vt == VT_I4 {
                Some(inner.Anonymous.lVal as u32)
            } else if inner.vt == VT_UI4 {
                Some(inner.Anonymous.ulVal)
            } else {
                None
            }
        };
        let _ = VariantClear(&mut value);
        result
    }
}
